//! UI state machine
//!
//! Pure state machine that wraps a [`Session`] and adapts it to a terminal:
//! session actions become redraws, frames to send, window titles and status
//! bar toasts. Completely decoupled from I/O.
//!
//! # Architecture
//!
//! The App owns the session and the UI-only state around it (status line,
//! toasts, terminal size). Chat content is never copied: the renderer reads
//! the timeline, conversations and roster straight from the session.

mod action;
mod event;
mod state;

use std::path::{Path, PathBuf};

pub use action::AppAction;
pub use event::AppEvent;
use pipechat_client::{
    ConnectionStatus, Environment, Session, SessionAction, SessionConfig, SessionError,
    SessionEvent, UploadId, UploadScope, UploadStatus,
};
use pipechat_core::NotificationPermission;
pub use state::{Toast, View};

/// UI state machine.
pub struct App<E: Environment> {
    session: Session<E>,
    /// Whether desktop-style notifications may be shown.
    notifications_enabled: bool,
    /// Live notifications, oldest first.
    toasts: Vec<Toast>,
    /// Window title last set by the session.
    title: String,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Status message to display. `None` if no message.
    status_message: Option<String>,
}

impl<E: Environment> App<E> {
    /// Create an App for `config.identity`.
    pub fn new(
        env: E,
        config: SessionConfig,
        notifications_enabled: bool,
    ) -> Result<Self, SessionError> {
        let title = config.title.clone();
        Ok(Self {
            session: Session::new(env, config)?,
            notifications_enabled,
            toasts: Vec::new(),
            title,
            terminal_size: (80, 24),
            status_message: None,
        })
    }

    /// Process an event and return actions for the runtime.
    pub fn handle(&mut self, event: AppEvent<E::Instant>) -> Vec<AppAction> {
        let session_event = match event {
            AppEvent::Tick { now } => SessionEvent::Tick { now },
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                return vec![AppAction::Render];
            },
            AppEvent::FocusGained => SessionEvent::FocusGained,
            AppEvent::FocusLost => SessionEvent::FocusLost,
            AppEvent::Connected => SessionEvent::Opened,
            AppEvent::Frame(raw) => SessionEvent::FrameReceived(raw),
            AppEvent::Disconnected { reason } => SessionEvent::Closed { reason },
            AppEvent::UploadFinished { id, result: Ok(file) } => {
                SessionEvent::UploadCompleted { id, file }
            },
            AppEvent::UploadFinished { id, result: Err(reason) } => {
                SessionEvent::UploadFailed { id, reason }
            },
        };
        self.dispatch(session_event)
    }

    /// Send a line typed in the composer to whatever the chat pane shows.
    pub fn submit(&mut self, text: String) -> Vec<AppAction> {
        let event = match self.session.conversations().open_peer() {
            Some(peer) => SessionEvent::SendPrivateMessage { peer: peer.to_string(), text },
            None => SessionEvent::SendRoomMessage { text },
        };
        self.dispatch(event)
    }

    /// Join a room.
    pub fn join(&mut self, room: String, password: Option<String>) -> Vec<AppAction> {
        self.dispatch(SessionEvent::Join { room, password })
    }

    /// Create (or join) a room from user input.
    pub fn create_room(&mut self, name: String) -> Vec<AppAction> {
        self.dispatch(SessionEvent::CreateRoom { name })
    }

    /// Ask the server to delete a room.
    pub fn delete_room(&mut self, room: String) -> Vec<AppAction> {
        self.dispatch(SessionEvent::DeleteRoom { room })
    }

    /// Send a private message without opening the conversation.
    pub fn send_private(&mut self, peer: String, text: String) -> Vec<AppAction> {
        self.dispatch(SessionEvent::SendPrivateMessage { peer, text })
    }

    /// Show a private conversation in the chat pane.
    pub fn open_conversation(&mut self, peer: String) -> Vec<AppAction> {
        self.dispatch(SessionEvent::OpenConversation { peer })
    }

    /// Return the chat pane to the room.
    pub fn close_conversation(&mut self) -> Vec<AppAction> {
        self.dispatch(SessionEvent::CloseConversation)
    }

    /// Empty the room view.
    pub fn clear_timeline(&mut self) -> Vec<AppAction> {
        self.dispatch(SessionEvent::ClearTimeline)
    }

    /// The user typed into the room composer.
    pub fn keystroke(&mut self) -> Vec<AppAction> {
        if self.session.conversations().open_peer().is_some() {
            return Vec::new();
        }
        self.dispatch(SessionEvent::Keystroke)
    }

    /// Activate the newest notification.
    pub fn activate_latest_notification(&mut self) -> Vec<AppAction> {
        let Some(toast) = self.toasts.last() else {
            self.set_status("No notifications");
            return vec![AppAction::Render];
        };
        let id = toast.id;
        self.dispatch(SessionEvent::NotificationActivated { id })
    }

    /// Begin an upload of `path`. The runtime answers with the file size via
    /// [`App::start_upload`].
    pub fn request_upload(&mut self, path: PathBuf) -> Vec<AppAction> {
        vec![AppAction::PrepareUpload { path }]
    }

    /// Register an upload of `path` to the current view and hand it to the
    /// runtime.
    pub fn start_upload(&mut self, path: PathBuf, size_bytes: u64) -> Vec<AppAction> {
        let name = file_name(&path);

        match self.session.begin_upload(self.upload_scope(), &name, size_bytes) {
            Ok(id) => vec![AppAction::Upload { id, path }, AppAction::Render],
            Err(e) => {
                self.set_status(format!("Cannot upload {name}: {e}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Forget the failed uploads shown in the current view.
    pub fn dismiss_failed_uploads(&mut self) -> Vec<AppAction> {
        let scope = self.upload_scope();
        let failed: Vec<UploadId> = self
            .session
            .uploads()
            .in_scope(&scope)
            .filter(|u| matches!(u.status, UploadStatus::Failed { .. }))
            .map(|u| u.id)
            .collect();
        for id in failed {
            self.session.dismiss_upload(id);
        }
        vec![AppAction::Render]
    }

    /// Scope of uploads started from the current view.
    pub fn upload_scope(&self) -> UploadScope {
        match self.session.conversations().open_peer() {
            Some(peer) => UploadScope::Private { peer: peer.to_string() },
            None => UploadScope::Room,
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set the status line.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// What the chat pane shows.
    pub fn view(&self) -> View<'_> {
        self.session.conversations().open_peer().map_or(View::Room, View::Private)
    }

    /// Live notifications, oldest first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Window title, including the unread badge.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Status message to display. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Feed one event to the session and translate what comes back.
    fn dispatch(&mut self, event: SessionEvent<E::Instant>) -> Vec<AppAction> {
        let mut pending = vec![event];
        let mut actions = Vec::new();
        let mut render = false;

        while let Some(event) = pending.pop() {
            let session_actions = match self.session.handle(event) {
                Ok(session_actions) => session_actions,
                Err(e) => {
                    self.set_status(e.to_string());
                    render = true;
                    continue;
                },
            };

            for action in session_actions {
                match action {
                    SessionAction::Send(request) => {
                        tracing::debug!(%request, "queue frame");
                        actions.push(AppAction::Send(request.encode()));
                    },
                    SessionAction::SetTitle(title) => {
                        self.title.clone_from(&title);
                        actions.push(AppAction::SetTitle(title));
                    },
                    SessionAction::ShowNotification { id, notification } => {
                        self.toasts.push(Toast { id, notification });
                        render = true;
                    },
                    SessionAction::CloseNotification { id } => {
                        self.toasts.retain(|t| t.id != id);
                        render = true;
                    },
                    SessionAction::RequestNotificationPermission => {
                        let permission = if self.notifications_enabled {
                            NotificationPermission::Granted
                        } else {
                            NotificationPermission::Denied
                        };
                        pending.push(SessionEvent::PermissionResolved(permission));
                    },
                    SessionAction::ConnectionChanged(ConnectionStatus::Disconnected) => {
                        self.set_status("Disconnected. Restart to reconnect.");
                        render = true;
                    },
                    SessionAction::RenderRoom(_)
                    | SessionAction::RenderPrivate { .. }
                    | SessionAction::ConversationOpened { .. }
                    | SessionAction::ConversationClosed { .. }
                    | SessionAction::UnreadChanged { .. }
                    | SessionAction::RosterChanged
                    | SessionAction::RoomsChanged
                    | SessionAction::RoomChanged { .. }
                    | SessionAction::TimelineCleared
                    | SessionAction::TypingIndicator(_)
                    | SessionAction::UploadFailed { .. }
                    | SessionAction::ConnectionChanged(_) => render = true,
                }
            }
        }

        if render {
            actions.push(AppAction::Render);
        }
        actions
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
