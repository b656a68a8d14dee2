//! UI events
//!
//! Events fed into the App state machine from the terminal, the connection
//! and finished uploads.

use pipechat_client::UploadId;
use pipechat_proto::FileDescriptor;

/// Events processed by the App state machine.
///
/// Key presses are not events: [`crate::InputState`] owns the line editor and
/// calls the App API directly when a line is submitted.
#[derive(Debug, Clone)]
pub enum AppEvent<I = std::time::Instant> {
    /// Periodic tick, drives session timers.
    Tick {
        /// Current time.
        now: I,
    },

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Terminal window gained focus.
    FocusGained,

    /// Terminal window lost focus.
    FocusLost,

    /// WebSocket connected.
    Connected,

    /// Text frame from the server.
    Frame(String),

    /// WebSocket closed or failed.
    Disconnected {
        /// Human-readable cause.
        reason: String,
    },

    /// An upload started with [`crate::AppAction::Upload`] finished.
    UploadFinished {
        /// Upload id.
        id: UploadId,
        /// Stored file, or why the upload failed.
        result: Result<FileDescriptor, String>,
    },
}
