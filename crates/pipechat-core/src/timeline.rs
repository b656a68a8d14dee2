//! Room timeline.
//!
//! Tracks which room the client is in and the log of everything shown in
//! the room view. The server scopes room traffic to the most recently joined
//! room, so appends carry no room name: whatever arrives belongs to
//! [`RoomTimeline::active_room`].
//!
//! Switching rooms does not clear the log. Earlier rooms' messages stay
//! visible above the new room's history until [`RoomTimeline::clear`].

use crate::{CoreError, Message};

/// Severity of a notice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational (`SYS` frames, connection changes).
    System,
    /// Server rejected something (`ERROR` frames, local failures).
    Error,
}

/// A non-message line in the room view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Text to display.
    pub text: String,
}

/// One line of the room view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    /// Chat message or file.
    Message(Message),
    /// System or error notice.
    Notice(Notice),
}

/// Active room and its append-only log.
#[derive(Debug, Clone, Default)]
pub struct RoomTimeline {
    active_room: Option<String>,
    log: Vec<TimelineEntry>,
}

impl RoomTimeline {
    /// Create an empty timeline with no active room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Room the client most recently joined.
    pub fn active_room(&self) -> Option<&str> {
        self.active_room.as_deref()
    }

    /// Every line appended since creation or the last [`Self::clear`].
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.log
    }

    /// Make `name` the active room.
    ///
    /// Returns `true` when the room changed and a `JOIN` must be sent.
    /// Switching to the room that is already active is a no-op.
    pub fn switch_room(&mut self, name: &str) -> Result<bool, CoreError> {
        if name.is_empty() {
            return Err(CoreError::EmptyRoomName);
        }
        CoreError::check_name("room name", name)?;

        if self.active_room.as_deref() == Some(name) {
            return Ok(false);
        }
        self.active_room = Some(name.to_string());
        Ok(true)
    }

    /// Create (or join) a room from user input. Surrounding whitespace is
    /// ignored; the server creates rooms on first join.
    pub fn create_room(&mut self, name: &str) -> Result<bool, CoreError> {
        self.switch_room(name.trim())
    }

    /// Forget the active room if it is `name`. Returns whether it was.
    ///
    /// A later join to any room, including one with the same name, is then
    /// treated as a switch.
    pub fn leave(&mut self, name: &str) -> bool {
        if self.active_room.as_deref() == Some(name) {
            self.active_room = None;
            return true;
        }
        false
    }

    /// Append a message.
    pub fn push_message(&mut self, message: Message) -> &TimelineEntry {
        self.push(TimelineEntry::Message(message))
    }

    /// Append a notice.
    pub fn push_notice(&mut self, kind: NoticeKind, text: impl Into<String>) -> &TimelineEntry {
        self.push(TimelineEntry::Notice(Notice { kind, text: text.into() }))
    }

    /// Drop every line. The active room is kept.
    pub fn clear(&mut self) {
        self.log.clear();
    }

    fn push(&mut self, entry: TimelineEntry) -> &TimelineEntry {
        self.log.push(entry);
        let last = self.log.len() - 1;
        &self.log[last]
    }
}
