//! Input state and key handling for the TUI.
//!
//! This module owns all text input state (buffer, cursor) and handles
//! character-level key events. Command parsing happens here on Enter.

use pipechat_client::Environment;

use crate::{
    App, AppAction,
    commands::{self, Command},
};

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key (cycle rooms).
    Tab,
    /// Escape key (close private view, or quit from the room view).
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Input state for the TUI.
///
/// Manages the text input buffer and cursor position. The cursor counts
/// characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position, in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle a key input event.
    ///
    /// Returns actions to process (may be empty for input-only keys, or
    /// contain protocol actions for commands).
    pub fn handle_key<E: Environment>(&mut self, key: KeyInput, app: &mut App<E>) -> Vec<AppAction> {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset();
                self.buffer.insert(at, c);
                self.cursor += 1;

                let mut actions = vec![AppAction::Render];
                if !self.buffer.starts_with('/') {
                    actions.extend(app.keystroke());
                }
                actions
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset();
                    self.buffer.remove(at);
                }
                vec![AppAction::Render]
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_offset();
                    self.buffer.remove(at);
                }
                vec![AppAction::Render]
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.cursor = 0;
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.cursor = self.len();
                vec![AppAction::Render]
            },
            KeyInput::Enter => self.handle_enter(app),
            KeyInput::Tab => Self::handle_tab(app),
            KeyInput::Esc => {
                if app.session().conversations().open_peer().is_some() {
                    app.close_conversation()
                } else {
                    app.quit()
                }
            },
        }
    }

    /// Handle Enter key - parse command and call App API.
    fn handle_enter<E: Environment>(&mut self, app: &mut App<E>) -> Vec<AppAction> {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        if text.trim().is_empty() {
            return vec![AppAction::Render];
        }

        match commands::parse(&text) {
            Command::Join { room, password } => app.join(room, password),
            Command::Create { name } => app.create_room(name),
            Command::Delete { room } => app.delete_room(room),
            Command::PrivateMessage { peer, text } => app.send_private(peer, text),
            Command::Open { peer } => app.open_conversation(peer),
            Command::Close => app.close_conversation(),
            Command::Upload { path } => app.request_upload(path),
            Command::Dismiss => app.dismiss_failed_uploads(),
            Command::Clear => app.clear_timeline(),
            Command::Go => app.activate_latest_notification(),
            Command::Quit => app.quit(),
            Command::Message { content } => app.submit(content),
            Command::Unknown { input } => {
                app.set_status(format!("Unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                app.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Handle Tab key - join the next listed room, wrapping around.
    fn handle_tab<E: Environment>(app: &mut App<E>) -> Vec<AppAction> {
        let session = app.session();
        let rooms = session.roster().rooms();
        if rooms.is_empty() {
            return vec![];
        }

        let current = session
            .timeline()
            .active_room()
            .and_then(|active| rooms.iter().position(|r| r.name == active));
        let next = current.map_or(0, |idx| (idx + 1) % rooms.len());

        let room = rooms[next].name.clone();
        if rooms[next].has_password {
            app.set_status(format!("{room} needs a password: /join {room} <password>"));
            return vec![AppAction::Render];
        }
        app.join(room, None)
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self) -> usize {
        self.buffer.char_indices().nth(self.cursor).map_or(self.buffer.len(), |(i, _)| i)
    }
}
