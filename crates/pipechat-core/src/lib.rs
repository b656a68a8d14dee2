//! Pipechat Core
//!
//! Client-side state for a Pipechat session. Every component here is a plain
//! data structure: no I/O, no clocks, no async. Time enters as an argument
//! and side effects leave as return values, so the session controller can
//! compose them and tests can drive them directly.
//!
//! # Components
//!
//! - [`RoomTimeline`]: Active room and its append-only log
//! - [`ConversationStore`]: Per-peer private logs and unread counters
//! - [`RosterTracker`]: Latest user and room snapshots
//! - [`AttentionManager`]: Focus, title badge, and notification gating
//! - [`TypingDebouncer`]: Outgoing typing rate limit and incoming indicator
//! - [`Scheduler`]: Keyed timers, rescheduling a key supersedes it
//! - [`Environment`]: Time source abstraction
//!
//! # Ownership
//!
//! Each component exclusively owns its store. Only the session controller
//! holds all of them, and only it turns their results into outbound frames.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod attention;
pub mod conversations;
pub mod display;
pub mod env;
pub mod error;
pub mod message;
pub mod roster;
pub mod timeline;
pub mod timer;
pub mod typing;

pub use attention::{
    AttentionManager, AttentionState, DEFAULT_TITLE, NOTIFICATION_TTL, Notification,
    NotificationAction, NotificationPermission,
};
pub use conversations::{Conversation, ConversationStore, Delivery};
pub use display::{PALETTE_SIZE, color_seed, format_size, initials};
pub use env::{Environment, Moment};
pub use error::CoreError;
pub use message::Message;
pub use roster::{RoomSummary, RosterEntry, RosterTracker};
pub use timeline::{Notice, NoticeKind, RoomTimeline, TimelineEntry};
pub use timer::Scheduler;
pub use typing::{TYPING_INDICATOR_TTL, TYPING_SEND_WINDOW, TypingDebouncer};
