//! Fuzz target for Session event handling
//!
//! Drives one session through arbitrary interleavings of server frames, user
//! intents, focus changes and clock ticks.
//!
//! # Invariants
//!
//! - The session NEVER panics
//! - Inbound frames never cause an outbound frame
//! - The unread total equals the sum over peers reported by `UnreadChanged`
//! - While focused, the window title carries no badge

#![no_main]

use std::{collections::BTreeSet, time::Duration};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pipechat_client::{Environment, Session, SessionAction, SessionConfig, SessionEvent};
use pipechat_core::{NotificationPermission, env::test_utils::MockEnv};

const PEERS: [&str; 3] = ["alice", "carol", "me"];
const ROOMS: [&str; 2] = ["lobby", "dev"];

#[derive(Debug, Clone, Arbitrary)]
enum Step {
    RawFrame(String),
    RoomMessage { peer: u8, text: String },
    PrivateIn { peer: u8, text: String },
    PrivateOut { peer: u8, text: String },
    Typing { peer: u8 },
    Join { room: u8 },
    RoomDeleted { room: u8 },
    Send { text: String },
    Open { peer: u8 },
    Close,
    Focus(bool),
    Advance { millis: u16 },
    Disconnect,
}

fn peer(idx: u8) -> &'static str {
    PEERS[usize::from(idx) % PEERS.len()]
}

fn room(idx: u8) -> &'static str {
    ROOMS[usize::from(idx) % ROOMS.len()]
}

fuzz_target!(|steps: Vec<Step>| {
    let env = MockEnv::new();
    let Ok(mut session) = Session::new(env.clone(), SessionConfig::new("me")) else {
        return;
    };
    let _ = session.handle(SessionEvent::Opened);
    let _ = session.handle(SessionEvent::PermissionResolved(NotificationPermission::Granted));
    let mut focused = true;
    // Every peer that was ever reported with unread messages.
    let mut unread_peers = BTreeSet::new();

    for step in steps {
        let (event, inbound) = match step {
            Step::RawFrame(raw) => (SessionEvent::FrameReceived(raw), true),
            Step::RoomMessage { peer: p, text } => {
                (SessionEvent::FrameReceived(format!("MSG|{}|{text}|1", peer(p))), true)
            },
            Step::PrivateIn { peer: p, text } => {
                (SessionEvent::FrameReceived(format!("PRIVATE|{}|{text}|1", peer(p))), true)
            },
            Step::PrivateOut { peer: p, text } => {
                (SessionEvent::FrameReceived(format!("PRIVATE_SENT|{}|{text}|1", peer(p))), true)
            },
            Step::Typing { peer: p } => {
                (SessionEvent::FrameReceived(format!("TYPING|{}", peer(p))), true)
            },
            Step::RoomDeleted { room: r } => {
                (SessionEvent::FrameReceived(format!("ROOM_DELETED|{}", room(r))), true)
            },
            Step::Join { room: r } => {
                (SessionEvent::Join { room: room(r).to_string(), password: None }, false)
            },
            Step::Send { text } => (SessionEvent::SendRoomMessage { text }, false),
            Step::Open { peer: p } => {
                (SessionEvent::OpenConversation { peer: peer(p).to_string() }, false)
            },
            Step::Close => (SessionEvent::CloseConversation, false),
            Step::Focus(true) => {
                focused = true;
                (SessionEvent::FocusGained, false)
            },
            Step::Focus(false) => {
                focused = false;
                (SessionEvent::FocusLost, false)
            },
            Step::Advance { millis } => {
                env.advance(Duration::from_millis(u64::from(millis)));
                (SessionEvent::Tick { now: env.now() }, false)
            },
            Step::Disconnect => (SessionEvent::Closed { reason: "fuzz".into() }, false),
        };

        let Ok(actions) = session.handle(event) else {
            continue;
        };

        if inbound {
            assert!(!actions.iter().any(|a| matches!(a, SessionAction::Send(_))));
        }

        for action in &actions {
            if let SessionAction::UnreadChanged { peer, .. } = action {
                unread_peers.insert(peer.clone());
            }
        }

        let conversations = session.conversations();
        let sum: u32 = unread_peers.iter().map(|p| conversations.unread_for(p)).sum();
        assert_eq!(conversations.total_unread(), sum);

        if focused {
            assert_eq!(session.attention().title(), "Pipechat");
        }
    }
});
