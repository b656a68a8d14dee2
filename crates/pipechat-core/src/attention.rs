//! Attention management.
//!
//! Decides whether the user should be pulled back to the window. Tracks
//! focus, accumulates a badge count shown in the window title while
//! unfocused, and gates desktop notifications on permission and focus.
//!
//! The manager only decides. Presenting a notification, closing it after
//! [`NOTIFICATION_TTL`], and routing its activation back are the caller's
//! job. It never touches conversation or timeline contents.

use std::time::Duration;

/// How long a notification stays up before it closes itself.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "Pipechat";

/// Desktop notification permission as reported by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// Not yet asked.
    #[default]
    Default,
    /// User allowed notifications.
    Granted,
    /// User refused notifications.
    Denied,
    /// Platform has no notification support.
    Unsupported,
}

/// Focus and badge state.
///
/// Created once per session. Regaining focus resets it to
/// `{ focused: true, badge_count: 0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionState {
    /// Window has focus.
    pub focused: bool,
    /// Events seen while unfocused.
    pub badge_count: u32,
}

impl Default for AttentionState {
    fn default() -> Self {
        Self { focused: true, badge_count: 0 }
    }
}

/// What activating a notification should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    /// Focus the window and open the private conversation with `peer`.
    OpenConversation {
        /// Conversation to open.
        peer: String,
    },
}

/// A desktop notification to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Heading.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Short icon glyph.
    pub icon: String,
    /// Activation behavior. `None` only focuses the window.
    pub on_activate: Option<NotificationAction>,
}

/// Focus tracking and notification gating.
#[derive(Debug, Clone)]
pub struct AttentionManager {
    state: AttentionState,
    permission: NotificationPermission,
    permission_requested: bool,
    base_title: String,
}

impl Default for AttentionManager {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl AttentionManager {
    /// Create a focused manager with no permission decision yet.
    pub fn new(base_title: impl Into<String>) -> Self {
        Self {
            state: AttentionState::default(),
            permission: NotificationPermission::Default,
            permission_requested: false,
            base_title: base_title.into(),
        }
    }

    /// Current focus and badge.
    pub fn state(&self) -> AttentionState {
        self.state
    }

    /// Current permission.
    pub fn permission(&self) -> NotificationPermission {
        self.permission
    }

    /// Window regained focus: clear the badge. Returns the restored title.
    pub fn on_focus_gained(&mut self) -> String {
        self.state = AttentionState::default();
        self.title()
    }

    /// Window lost focus.
    pub fn on_focus_lost(&mut self) {
        self.state.focused = false;
    }

    /// Something arrived the user has not seen. Bumps the badge while
    /// unfocused and returns the new title; `None` while focused.
    pub fn note_unseen_event(&mut self) -> Option<String> {
        if self.state.focused {
            return None;
        }
        self.state.badge_count += 1;
        Some(self.title())
    }

    /// Window title including the badge, e.g. `(3) Pipechat`.
    pub fn title(&self) -> String {
        match self.state.badge_count {
            0 => self.base_title.clone(),
            n => format!("({n}) {}", self.base_title),
        }
    }

    /// Whether a notification would be shown right now.
    pub fn should_notify(&self) -> bool {
        self.permission == NotificationPermission::Granted && !self.state.focused
    }

    /// Pass `notification` through when it may be shown, otherwise drop it.
    pub fn maybe_notify(&self, notification: Notification) -> Option<Notification> {
        self.should_notify().then_some(notification)
    }

    /// Ask for permission, at most once per session. Returns `true` when the
    /// caller should prompt now.
    pub fn request_permission(&mut self) -> bool {
        if self.permission_requested || self.permission != NotificationPermission::Default {
            return false;
        }
        self.permission_requested = true;
        true
    }

    /// Record the presenter's answer.
    pub fn set_permission(&mut self, permission: NotificationPermission) {
        self.permission = permission;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            title: "Private message from carol".into(),
            body: "hey".into(),
            icon: "💬".into(),
            on_activate: Some(NotificationAction::OpenConversation { peer: "carol".into() }),
        }
    }

    #[test]
    fn badge_only_counts_while_unfocused() {
        let mut attention = AttentionManager::new("Pipechat");

        assert_eq!(attention.note_unseen_event(), None);

        attention.on_focus_lost();
        assert_eq!(attention.note_unseen_event().as_deref(), Some("(1) Pipechat"));
        assert_eq!(attention.note_unseen_event().as_deref(), Some("(2) Pipechat"));
    }

    #[test]
    fn focus_resets_badge_and_title() {
        let mut attention = AttentionManager::new("Pipechat");
        attention.on_focus_lost();
        attention.note_unseen_event();

        assert_eq!(attention.on_focus_gained(), "Pipechat");
        assert_eq!(attention.state(), AttentionState { focused: true, badge_count: 0 });
    }

    #[test]
    fn never_notifies_while_focused() {
        let mut attention = AttentionManager::new("Pipechat");
        attention.set_permission(NotificationPermission::Granted);

        assert!(attention.maybe_notify(notification()).is_none());

        attention.on_focus_lost();
        assert!(attention.maybe_notify(notification()).is_some());
    }

    #[test]
    fn denied_permission_suppresses_but_badge_still_counts() {
        let mut attention = AttentionManager::new("Pipechat");
        attention.set_permission(NotificationPermission::Denied);
        attention.on_focus_lost();

        assert!(attention.maybe_notify(notification()).is_none());
        assert!(attention.note_unseen_event().is_some());
    }

    #[test]
    fn permission_requested_once() {
        let mut attention = AttentionManager::new("Pipechat");

        assert!(attention.request_permission());
        assert!(!attention.request_permission());
    }

    #[test]
    fn permission_not_requested_after_decision() {
        let mut attention = AttentionManager::new("Pipechat");
        attention.set_permission(NotificationPermission::Unsupported);

        assert!(!attention.request_permission());
    }
}
