//! UI state types
//!
//! State structures used by the App state machine.

use pipechat_client::NotificationId;
use pipechat_core::Notification;

/// What the chat pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// Active room timeline.
    Room,
    /// Private conversation with a peer.
    Private(&'a str),
}

/// A notification shown in the status bar until it expires or is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Session id, reported back on activation.
    pub id: NotificationId,
    /// What to show.
    pub notification: Notification,
}

impl Toast {
    /// One-line rendering.
    pub fn line(&self) -> String {
        let n = &self.notification;
        format!("{} {}: {}", n.icon, n.title, n.body)
    }
}
