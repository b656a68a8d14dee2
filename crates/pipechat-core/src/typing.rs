//! Typing notifications.
//!
//! Outgoing: keystrokes are coalesced so at most one `TYPING|` frame leaves
//! per [`TYPING_SEND_WINDOW`]. Incoming: the indicator shows the most recent
//! typist and the caller clears it [`TYPING_INDICATOR_TTL`] after the latest
//! notice, using a single superseded timer.

use std::time::Duration;

use crate::Moment;

/// Minimum spacing between outgoing typing notices.
pub const TYPING_SEND_WINDOW: Duration = Duration::from_secs(1);

/// How long an incoming typing indicator stays visible.
pub const TYPING_INDICATOR_TTL: Duration = Duration::from_secs(2);

/// Typing send limiter and indicator holder.
#[derive(Debug, Clone)]
pub struct TypingDebouncer<I> {
    window: Duration,
    last_sent: Option<I>,
    typist: Option<String>,
}

impl<I: Moment> Default for TypingDebouncer<I> {
    fn default() -> Self {
        Self::new(TYPING_SEND_WINDOW)
    }
}

impl<I: Moment> TypingDebouncer<I> {
    /// Create a debouncer with the given send window.
    pub fn new(window: Duration) -> Self {
        Self { window, last_sent: None, typist: None }
    }

    /// Local keystroke at `now`. Returns `true` when a typing notice should
    /// be sent.
    pub fn on_keystroke(&mut self, now: I) -> bool {
        match self.last_sent {
            Some(last) if now - last < self.window => false,
            _ => {
                self.last_sent = Some(now);
                true
            },
        }
    }

    /// Forget the send window, e.g. after the message was sent, so the next
    /// keystroke notifies immediately.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }

    /// Someone is typing. Returns the indicator text.
    pub fn show(&mut self, sender: &str) -> String {
        self.typist = Some(sender.to_string());
        indicator_text(sender)
    }

    /// Clear the indicator. Returns whether one was showing.
    pub fn clear(&mut self) -> bool {
        self.typist.take().is_some()
    }

    /// Current indicator text.
    pub fn indicator(&self) -> Option<String> {
        self.typist.as_deref().map(indicator_text)
    }
}

fn indicator_text(sender: &str) -> String {
    format!("{sender} is typing...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn keystrokes_coalesce_within_window() {
        let mut typing = TypingDebouncer::default();

        assert!(typing.on_keystroke(ms(0)));
        assert!(!typing.on_keystroke(ms(200)));
        assert!(!typing.on_keystroke(ms(999)));
        assert!(typing.on_keystroke(ms(1000)));
    }

    #[test]
    fn reset_allows_immediate_send() {
        let mut typing = TypingDebouncer::default();
        typing.on_keystroke(ms(0));
        typing.reset();

        assert!(typing.on_keystroke(ms(10)));
    }

    #[test]
    fn indicator_shows_latest_typist() {
        let mut typing = TypingDebouncer::<Duration>::default();

        assert_eq!(typing.show("alice"), "alice is typing...");
        typing.show("carol");
        assert_eq!(typing.indicator().as_deref(), Some("carol is typing..."));

        assert!(typing.clear());
        assert!(!typing.clear());
        assert_eq!(typing.indicator(), None);
    }
}
