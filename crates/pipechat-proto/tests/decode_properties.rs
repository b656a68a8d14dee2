//! Property-based tests for frame decoding
//!
//! The decoder faces whatever the server (or a hostile peer relaying through
//! it) sends. These tests verify it is total over arbitrary input and that
//! free-text fields survive embedded delimiters.

use pipechat_proto::{Body, Direction, Event, FileKind, Opcode, Request};
use proptest::prelude::*;

/// Identities and room names never contain the delimiter.
fn arbitrary_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ]{1,16}"
}

/// Free text may contain anything, including `|`.
fn arbitrary_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just('|'), any::<char>()], 0..64)
        .prop_map(|chars| chars.into_iter().filter(|c| *c != '\r' && *c != '\n').collect())
}

/// Strategy for tags, mixing real opcodes with junk
fn arbitrary_tag() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("MSG".to_string()),
        Just("HISTORY".to_string()),
        Just("PRIVATE".to_string()),
        Just("PRIVATE_SENT".to_string()),
        Just("FILE".to_string()),
        Just("PRIVATE_FILE".to_string()),
        Just("PRIVATE_FILE_SENT".to_string()),
        Just("USERS".to_string()),
        Just("ROOMS".to_string()),
        Just("TYPING".to_string()),
        Just("SYS".to_string()),
        Just("ERROR".to_string()),
        Just("ROOM_DELETED".to_string()),
        Just("JOIN".to_string()),
        "[A-Z_]{0,12}",
    ]
}

#[test]
fn prop_decode_is_total() {
    proptest!(|(raw in ".*")| {
        // PROPERTY: any string yields an event without panicking
        let _ = Event::decode(&raw);
    });
}

#[test]
fn prop_decode_is_total_for_known_tags() {
    proptest!(|(tag in arbitrary_tag(), rest in arbitrary_text())| {
        let raw = format!("{tag}|{rest}");
        let event = Event::decode(&raw);

        // PROPERTY: a known tag never decodes as an unknown one
        if let Event::Discard { reason } = &event {
            if Opcode::from_tag(&tag).is_some() {
                prop_assert!(
                    !matches!(reason, pipechat_proto::ProtocolError::UnknownOpcode(_)),
                    "known tag {} reported unknown",
                    tag
                );
            }
        }
    });
}

#[test]
fn prop_message_body_survives_delimiters() {
    proptest!(|(sender in arbitrary_name(), body in arbitrary_text(), ts in any::<u64>())| {
        let raw = format!("MSG|{sender}|{body}|{ts}");

        match Event::decode(&raw) {
            Event::RoomMessage(post) => {
                prop_assert_eq!(post.sender, sender);
                prop_assert_eq!(post.body, Body::Text(body));
                prop_assert_eq!(post.timestamp, ts);
            },
            other => prop_assert!(false, "expected room message, got {:?}", other),
        }
    });
}

#[test]
fn prop_history_body_survives_delimiters() {
    proptest!(|(sender in arbitrary_name(), body in arbitrary_text(), ts in any::<u64>())| {
        let raw = format!("HISTORY|MSG|{sender}|{body}|{ts}");

        match Event::decode(&raw) {
            Event::HistoryMessage(post) => {
                prop_assert_eq!(post.sender, sender);
                prop_assert_eq!(post.body, Body::Text(body));
            },
            other => prop_assert!(false, "expected history message, got {:?}", other),
        }
    });
}

#[test]
fn prop_file_name_survives_delimiters() {
    proptest!(|(
        sender in arbitrary_name(),
        name in arbitrary_text(),
        size in any::<u64>(),
        ts in any::<u64>(),
    )| {
        let raw = format!("PRIVATE_FILE_SENT|{sender}|/api/files/x|video|{name}|{size}|{ts}");

        match Event::decode(&raw) {
            Event::PrivateFileMessage { direction, post } => {
                prop_assert_eq!(direction, Direction::Outgoing);
                prop_assert_eq!(post.sender, sender);
                let Body::File(file) = post.body else {
                    return Err(TestCaseError::fail("expected file body"));
                };
                prop_assert_eq!(file.name, name);
                prop_assert_eq!(file.kind, FileKind::Video);
                prop_assert_eq!(file.size_bytes, size);
            },
            other => prop_assert!(false, "expected private file, got {:?}", other),
        }
    });
}

#[test]
fn prop_outbound_private_matches_inbound_shape() {
    proptest!(|(peer in arbitrary_name(), text in arbitrary_text(), ts in any::<u64>())| {
        // The server echoes PRIVATE_SENT with a timestamp appended to what we sent.
        let sent = Request::Private { peer: peer.clone(), text: text.clone() }.encode();
        let echo = format!("{}|{ts}", sent.replacen("PRIVATE|", "PRIVATE_SENT|", 1));

        match Event::decode(&echo) {
            Event::PrivateMessage { direction, post } => {
                prop_assert_eq!(direction, Direction::Outgoing);
                prop_assert_eq!(post.sender, peer);
                prop_assert_eq!(post.body, Body::Text(text));
            },
            other => prop_assert!(false, "expected private message, got {:?}", other),
        }
    });
}

#[test]
fn scenario_live_message_from_other_user() {
    let Event::RoomMessage(post) = Event::decode("MSG|alice|hello|1700000000000") else {
        unreachable!("MSG decodes to a room message");
    };
    assert_eq!(post.sender, "alice");
    assert_eq!(post.timestamp, 1_700_000_000_000);
}

#[test]
fn scenario_garbage_is_discarded() {
    assert!(matches!(Event::decode("garbage-no-pipe"), Event::Discard { .. }));
}
