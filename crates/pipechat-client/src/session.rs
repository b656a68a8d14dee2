//! Session state machine.
//!
//! The `Session` is the top-level orchestrator for one connection. It decodes
//! inbound frames and dispatches each decoded event to exactly one state
//! component (timeline, conversations, or roster), with the attention
//! manager observing every delivery. Outbound intents are validated against
//! that state and turned into [`Request`]s.
//!
//! Dispatch is strictly sequential: one event is fully handled before the
//! next, so a component's view of "is this conversation open" can never
//! change between the check and the append.

use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use pipechat_core::{
    AttentionManager, ConversationStore, CoreError, DEFAULT_TITLE, Delivery, Environment, Message,
    NOTIFICATION_TTL, NoticeKind, Notification, NotificationAction, RoomTimeline, RosterTracker,
    Scheduler, TYPING_INDICATOR_TTL, TYPING_SEND_WINDOW, TypingDebouncer, format_size, initials,
};
use pipechat_proto::{Body, Direction, Event, FileDescriptor, Post, Request};

use crate::{
    SessionError, UploadId, UploadScope, UploadTracker,
    event::{ConnectionStatus, NotificationId, SessionAction, SessionEvent},
};

/// Largest file the client will try to upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Local identity (username).
    pub identity: String,
    /// Base window title.
    pub title: String,
    /// Minimum spacing between outgoing typing notices.
    pub typing_send_window: Duration,
    /// How long an incoming typing indicator stays up.
    pub typing_indicator_ttl: Duration,
    /// How long a notification stays up.
    pub notification_ttl: Duration,
    /// Upload size limit.
    pub max_upload_bytes: u64,
}

impl SessionConfig {
    /// Defaults for `identity`.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            title: DEFAULT_TITLE.to_string(),
            typing_send_window: TYPING_SEND_WINDOW,
            typing_indicator_ttl: TYPING_INDICATOR_TTL,
            notification_ttl: NOTIFICATION_TTL,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// Timers owned by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    /// Hide the typing indicator.
    TypingIndicator,
    /// Dismiss a notification.
    CloseNotification(NotificationId),
}

/// Request still waiting for its reply.
///
/// The server answers requests in the order it receives them: a `JOIN` gets
/// either this session's own `SYS` join notice or an `ERROR`, and a
/// `DELETE_ROOM` gets an `ERROR` only when it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Awaiting {
    Join(String),
    /// `listed` records whether the room was in the room list when the
    /// request was sent; only then does a later list without it count as
    /// success.
    DeleteRoom { room: String, listed: bool },
}

/// Session controller for one connection.
pub struct Session<E: Environment> {
    env: E,
    config: SessionConfig,
    /// Avatar initials sent with every join.
    initials: String,
    status: ConnectionStatus,
    timeline: RoomTimeline,
    /// Requests awaiting a reply, oldest first. A rejected join leaves the
    /// session in no room on the server.
    awaiting: VecDeque<Awaiting>,
    conversations: ConversationStore,
    roster: RosterTracker,
    attention: AttentionManager,
    typing: TypingDebouncer<E::Instant>,
    timers: Scheduler<E::Instant, TimerKind>,
    uploads: UploadTracker,
    /// Notifications currently shown, for routing activation.
    notifications: HashMap<NotificationId, Notification>,
    next_notification: u64,
}

impl<E: Environment> Session<E> {
    /// Create a session for `config.identity`.
    pub fn new(env: E, config: SessionConfig) -> Result<Self, SessionError> {
        let identity = config.identity.trim().to_string();
        if identity.is_empty() || identity.contains(pipechat_proto::DELIMITER) {
            return Err(SessionError::InvalidIdentity(config.identity));
        }
        let config = SessionConfig { identity, ..config };

        Ok(Self {
            env,
            initials: initials(&config.identity),
            status: ConnectionStatus::Connecting,
            timeline: RoomTimeline::new(),
            awaiting: VecDeque::new(),
            conversations: ConversationStore::new(),
            roster: RosterTracker::new(),
            attention: AttentionManager::new(config.title.clone()),
            typing: TypingDebouncer::new(config.typing_send_window),
            timers: Scheduler::new(),
            uploads: UploadTracker::new(),
            notifications: HashMap::new(),
            next_notification: 0,
            config,
        })
    }

    /// Local identity.
    pub fn identity(&self) -> &str {
        &self.config.identity
    }

    /// Connection state.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Room view state.
    pub fn timeline(&self) -> &RoomTimeline {
        &self.timeline
    }

    /// Private conversations.
    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// User and room snapshots.
    pub fn roster(&self) -> &RosterTracker {
        &self.roster
    }

    /// Focus and badge state.
    pub fn attention(&self) -> &AttentionManager {
        &self.attention
    }

    /// Upload placeholders.
    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    /// Current typing indicator text.
    pub fn typing_indicator(&self) -> Option<String> {
        self.typing.indicator()
    }

    /// Earliest pending timer, for drivers that sleep until the next tick.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        self.timers.next_deadline()
    }

    /// Register an upload before starting it.
    ///
    /// Validates the target and size up front so nothing is sent to the
    /// upload endpoint for a file that could never be announced. The caller
    /// runs the upload and reports back with
    /// [`SessionEvent::UploadCompleted`] or [`SessionEvent::UploadFailed`].
    pub fn begin_upload(
        &mut self,
        scope: UploadScope,
        name: &str,
        size_bytes: u64,
    ) -> Result<UploadId, SessionError> {
        self.ensure_connected()?;
        if size_bytes > self.config.max_upload_bytes {
            return Err(SessionError::FileTooLarge {
                size: size_bytes,
                limit: self.config.max_upload_bytes,
            });
        }
        self.check_scope(&scope)?;
        check_delimiter("file name", name)?;

        let id = self.uploads.start(scope, name, size_bytes);
        tracing::debug!(%id, name, size_bytes, "upload started");
        Ok(id)
    }

    /// Drop a failed upload's placeholder.
    pub fn dismiss_upload(&mut self, id: UploadId) -> bool {
        self.uploads.dismiss(id)
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: SessionEvent<E::Instant>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::Opened => Ok(self.handle_opened()),
            SessionEvent::FrameReceived(raw) => Ok(self.handle_frame(&raw)),
            SessionEvent::Closed { reason } => Ok(self.handle_closed(&reason)),
            SessionEvent::Tick { now } => Ok(self.handle_tick(now)),
            SessionEvent::FocusGained => {
                Ok(vec![SessionAction::SetTitle(self.attention.on_focus_gained())])
            },
            SessionEvent::FocusLost => {
                self.attention.on_focus_lost();
                Ok(Vec::new())
            },
            SessionEvent::PermissionResolved(permission) => {
                tracing::debug!(?permission, "notification permission resolved");
                self.attention.set_permission(permission);
                Ok(Vec::new())
            },
            SessionEvent::NotificationActivated { id } => Ok(self.handle_activation(id)),
            SessionEvent::Join { room, password } => self.handle_join(&room, password),
            SessionEvent::CreateRoom { name } => self.handle_create_room(&name),
            SessionEvent::DeleteRoom { room } => self.handle_delete_room(room),
            SessionEvent::SendRoomMessage { text } => self.handle_send_room_message(&text),
            SessionEvent::SendPrivateMessage { peer, text } => {
                self.handle_send_private_message(peer, &text)
            },
            SessionEvent::OpenConversation { peer } => self.handle_open_conversation(&peer),
            SessionEvent::CloseConversation => Ok(self
                .conversations
                .close_conversation()
                .map(|peer| SessionAction::ConversationClosed { peer })
                .into_iter()
                .collect()),
            SessionEvent::Keystroke => Ok(self.handle_keystroke()),
            SessionEvent::UploadCompleted { id, file } => self.handle_upload_completed(id, file),
            SessionEvent::UploadFailed { id, reason } => self.handle_upload_failed(id, reason),
            SessionEvent::AnnounceFile { scope, file } => {
                self.ensure_connected()?;
                self.check_scope(&scope)?;
                Ok(vec![SessionAction::Send(announce(scope, file))])
            },
            SessionEvent::ClearTimeline => {
                self.timeline.clear();
                Ok(vec![SessionAction::TimelineCleared])
            },
        }
    }

    fn handle_opened(&mut self) -> Vec<SessionAction> {
        tracing::info!(identity = %self.config.identity, "connected");
        self.status = ConnectionStatus::Connected;
        vec![
            SessionAction::ConnectionChanged(ConnectionStatus::Connected),
            SessionAction::Send(Request::GetRooms),
        ]
    }

    fn handle_closed(&mut self, reason: &str) -> Vec<SessionAction> {
        if self.status == ConnectionStatus::Disconnected {
            return Vec::new();
        }
        tracing::info!(reason, "disconnected");
        self.status = ConnectionStatus::Disconnected;
        self.awaiting.clear();

        let text = if reason.is_empty() {
            "Disconnected from server".to_string()
        } else {
            format!("Disconnected from server: {reason}")
        };
        let entry = self.timeline.push_notice(NoticeKind::System, text).clone();
        vec![
            SessionAction::ConnectionChanged(ConnectionStatus::Disconnected),
            SessionAction::RenderRoom(entry),
        ]
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        for timer in self.timers.expire(now) {
            match timer {
                TimerKind::TypingIndicator => {
                    if self.typing.clear() {
                        actions.push(SessionAction::TypingIndicator(None));
                    }
                },
                TimerKind::CloseNotification(id) => {
                    if self.notifications.remove(&id).is_some() {
                        actions.push(SessionAction::CloseNotification { id });
                    }
                },
            }
        }

        actions
    }

    fn handle_activation(&mut self, id: NotificationId) -> Vec<SessionAction> {
        // Activation after the notification closed itself is harmless.
        let Some(notification) = self.notifications.remove(&id) else {
            return Vec::new();
        };
        self.timers.cancel_key(&TimerKind::CloseNotification(id));

        let mut actions = vec![
            SessionAction::CloseNotification { id },
            SessionAction::SetTitle(self.attention.on_focus_gained()),
        ];
        if let Some(NotificationAction::OpenConversation { peer }) = notification.on_activate {
            let messages = self.conversations.open_conversation(&peer).to_vec();
            actions.push(SessionAction::UnreadChanged { peer: peer.clone(), count: 0 });
            actions.push(SessionAction::ConversationOpened { peer, messages });
        }
        actions
    }

    fn handle_join(
        &mut self,
        room: &str,
        password: Option<String>,
    ) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_connected()?;
        let changed = self.timeline.switch_room(room)?;
        Ok(self.join_actions(room, changed, password))
    }

    fn handle_create_room(&mut self, name: &str) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_connected()?;
        let changed = self.timeline.create_room(name)?;
        Ok(self.join_actions(name.trim(), changed, None))
    }

    fn join_actions(
        &mut self,
        room: &str,
        changed: bool,
        password: Option<String>,
    ) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if self.attention.request_permission() {
            actions.push(SessionAction::RequestNotificationPermission);
        }
        if !changed {
            tracing::debug!(room, "already in room");
            return actions;
        }

        tracing::info!(room, "joining room");
        self.awaiting.push_back(Awaiting::Join(room.to_string()));
        actions.push(SessionAction::RoomChanged { room: Some(room.to_string()) });
        actions.push(SessionAction::Send(Request::Join {
            room: room.to_string(),
            identity: self.config.identity.clone(),
            initials: self.initials.clone(),
            password,
        }));
        actions
    }

    fn handle_delete_room(&mut self, room: String) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_connected()?;
        let room = room.trim().to_string();
        if room.is_empty() {
            return Err(CoreError::EmptyRoomName.into());
        }
        CoreError::check_name("room name", &room)?;

        let listed = self.roster.room(&room).is_some();
        self.awaiting.push_back(Awaiting::DeleteRoom { room: room.clone(), listed });
        Ok(vec![SessionAction::Send(Request::DeleteRoom { room })])
    }

    fn handle_send_room_message(&mut self, text: &str) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_connected()?;
        if self.timeline.active_room().is_none() {
            return Err(SessionError::NoActiveRoom);
        }
        let text = non_empty_text(text)?;

        self.typing.reset();
        Ok(vec![SessionAction::Send(Request::Message { text })])
    }

    fn handle_send_private_message(
        &mut self,
        peer: String,
        text: &str,
    ) -> Result<Vec<SessionAction>, SessionError> {
        self.ensure_connected()?;
        check_peer(&peer)?;
        let text = non_empty_text(text)?;

        // The message is recorded when the server echoes it back.
        Ok(vec![SessionAction::Send(Request::Private { peer, text })])
    }

    fn handle_open_conversation(&mut self, peer: &str) -> Result<Vec<SessionAction>, SessionError> {
        check_peer(peer)?;

        let mut actions = Vec::new();
        if let Some(previous) = self.conversations.open_peer().filter(|p| *p != peer) {
            actions.push(SessionAction::ConversationClosed { peer: previous.to_string() });
        }

        let messages = self.conversations.open_conversation(peer).to_vec();
        actions.push(SessionAction::UnreadChanged { peer: peer.to_string(), count: 0 });
        actions.push(SessionAction::ConversationOpened { peer: peer.to_string(), messages });
        Ok(actions)
    }

    fn handle_keystroke(&mut self) -> Vec<SessionAction> {
        if self.status != ConnectionStatus::Connected || self.timeline.active_room().is_none() {
            return Vec::new();
        }
        if self.typing.on_keystroke(self.env.now()) {
            vec![SessionAction::Send(Request::Typing)]
        } else {
            Vec::new()
        }
    }

    fn handle_upload_completed(
        &mut self,
        id: UploadId,
        file: FileDescriptor,
    ) -> Result<Vec<SessionAction>, SessionError> {
        if self.status != ConnectionStatus::Connected {
            // The file is on the server but can no longer be announced.
            return self.handle_upload_failed(id, "connection closed before announcing".into());
        }

        let upload = self.uploads.complete(id).ok_or(SessionError::UnknownUpload(id))?;
        tracing::debug!(%id, url = %file.url, "upload completed");
        Ok(vec![SessionAction::Send(announce(upload.scope, file))])
    }

    fn handle_upload_failed(
        &mut self,
        id: UploadId,
        reason: String,
    ) -> Result<Vec<SessionAction>, SessionError> {
        let upload = self.uploads.fail(id, reason.clone()).ok_or(SessionError::UnknownUpload(id))?;
        tracing::warn!(%id, name = %upload.name, %reason, "upload failed");
        Ok(vec![SessionAction::UploadFailed { id, scope: upload.scope.clone(), reason }])
    }

    fn handle_frame(&mut self, raw: &str) -> Vec<SessionAction> {
        let event = Event::decode(raw);
        tracing::trace!(?event, "frame decoded");

        match event {
            Event::Discard { reason } => {
                tracing::warn!(%reason, "discarding frame");
                Vec::new()
            },
            Event::SystemNotice { text } => {
                if text == self.join_notice() {
                    self.confirm_join();
                }
                self.render_notice(NoticeKind::System, text)
            },
            Event::ServerError { text } => {
                let mut actions = self.resolve_error();
                actions.extend(self.render_notice(NoticeKind::Error, text));
                actions
            },
            Event::RoomDeleted { room } => self.handle_room_deleted(room),
            Event::RoomMessage(post) | Event::RoomFileMessage(post) => self.handle_room_post(post),
            Event::HistoryMessage(post) => {
                let message = Message::from_room(post, &self.config.identity);
                vec![SessionAction::RenderRoom(self.timeline.push_message(message).clone())]
            },
            Event::PrivateMessage { direction, post }
            | Event::PrivateFileMessage { direction, post } => {
                self.handle_private_post(direction, post)
            },
            Event::RosterSnapshot(users) => {
                tracing::debug!(count = users.len(), "roster snapshot");
                self.roster.replace_users(users);
                vec![SessionAction::RosterChanged]
            },
            Event::RoomListSnapshot(rooms) => {
                tracing::debug!(count = rooms.len(), "room snapshot");
                self.roster.replace_rooms(rooms);
                self.settle_deletes();
                vec![SessionAction::RoomsChanged]
            },
            Event::TypingNotice { sender } => self.handle_typing_notice(&sender),
        }
    }

    /// Text the server broadcasts when this session's join succeeds.
    fn join_notice(&self) -> String {
        format!("{} joined room", self.config.identity)
    }

    /// Own join notice: every delete ahead of the oldest join succeeded
    /// silently, and that join is accepted.
    fn confirm_join(&mut self) {
        let Some(at) = self.awaiting.iter().position(|a| matches!(a, Awaiting::Join(_))) else {
            return;
        };
        for awaiting in self.awaiting.drain(..=at) {
            if let Awaiting::Join(room) = awaiting {
                tracing::debug!(%room, "join confirmed");
            }
        }
    }

    /// A listed room missing from a fresh room list was deleted.
    fn settle_deletes(&mut self) {
        let roster = &self.roster;
        self.awaiting.retain(|awaiting| match awaiting {
            Awaiting::DeleteRoom { room, listed: true } => roster.room(room).is_some(),
            _ => true,
        });
    }

    /// Match an `ERROR` to the oldest request awaiting a reply. A refused
    /// join is undone so a retry to the same room sends `JOIN` again.
    fn resolve_error(&mut self) -> Vec<SessionAction> {
        let Some(Awaiting::Join(room)) = self.awaiting.pop_front() else {
            return Vec::new();
        };
        if !self.timeline.leave(&room) {
            return Vec::new();
        }
        tracing::info!(%room, "join rejected");
        vec![SessionAction::RoomChanged { room: None }]
    }

    fn render_notice(&mut self, kind: NoticeKind, text: String) -> Vec<SessionAction> {
        vec![SessionAction::RenderRoom(self.timeline.push_notice(kind, text).clone())]
    }

    fn handle_room_deleted(&mut self, room: String) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if self.timeline.leave(&room) {
            tracing::info!(%room, "active room deleted");
            actions.push(SessionAction::RoomChanged { room: None });
        }
        actions.extend(self.render_notice(NoticeKind::System, format!("Room {room} was deleted")));
        actions
    }

    fn handle_room_post(&mut self, post: Post) -> Vec<SessionAction> {
        let message = Message::from_room(post, &self.config.identity);
        let notification = (!message.originated_locally).then(|| Notification {
            title: format!("Message from {}", message.sender),
            body: preview(&message.body),
            icon: icon(&message.body, "💬"),
            on_activate: None,
        });

        let mut actions =
            vec![SessionAction::RenderRoom(self.timeline.push_message(message).clone())];
        if let Some(notification) = notification {
            self.notify(notification, &mut actions);
        }
        actions
    }

    fn handle_private_post(&mut self, direction: Direction, post: Post) -> Vec<SessionAction> {
        let peer = post.sender.clone();
        let message = Message::from_private(post, direction, &self.config.identity);
        let rendered = message.clone();

        let delivery = match direction {
            Direction::Incoming => self.conversations.record_incoming(&peer, message),
            Direction::Outgoing => self.conversations.record_outgoing(&peer, message),
        };
        tracing::debug!(peer = %peer, ?direction, ?delivery, "private message recorded");

        match delivery {
            Delivery::Rendered => vec![SessionAction::RenderPrivate { peer, message: rendered }],
            Delivery::Recorded => Vec::new(),
            Delivery::Unread { count } => {
                let mut actions = vec![SessionAction::UnreadChanged { peer: peer.clone(), count }];
                self.notify(
                    Notification {
                        title: format!("Private message from {peer}"),
                        body: preview(&rendered.body),
                        icon: icon(&rendered.body, "🔒"),
                        on_activate: Some(NotificationAction::OpenConversation { peer }),
                    },
                    &mut actions,
                );
                actions
            },
        }
    }

    fn handle_typing_notice(&mut self, sender: &str) -> Vec<SessionAction> {
        if sender == self.config.identity {
            return Vec::new();
        }
        let text = self.typing.show(sender);
        let deadline = self.env.now() + self.config.typing_indicator_ttl;
        self.timers.schedule(TimerKind::TypingIndicator, deadline);
        vec![SessionAction::TypingIndicator(Some(text))]
    }

    /// Offer a notification to the attention manager and bump the badge.
    fn notify(&mut self, notification: Notification, actions: &mut Vec<SessionAction>) {
        if let Some(notification) = self.attention.maybe_notify(notification) {
            let id = NotificationId(self.next_notification);
            self.next_notification += 1;

            let deadline = self.env.now() + self.config.notification_ttl;
            self.timers.schedule(TimerKind::CloseNotification(id), deadline);
            self.notifications.insert(id, notification.clone());
            actions.push(SessionAction::ShowNotification { id, notification });
        }
        if let Some(title) = self.attention.note_unseen_event() {
            actions.push(SessionAction::SetTitle(title));
        }
    }

    fn ensure_connected(&self) -> Result<(), SessionError> {
        match self.status {
            ConnectionStatus::Connected => Ok(()),
            ConnectionStatus::Connecting | ConnectionStatus::Disconnected => {
                Err(SessionError::Disconnected)
            },
        }
    }

    fn check_scope(&self, scope: &UploadScope) -> Result<(), SessionError> {
        match scope {
            UploadScope::Room if self.timeline.active_room().is_none() => {
                Err(SessionError::NoActiveRoom)
            },
            UploadScope::Room => Ok(()),
            UploadScope::Private { peer } => check_peer(peer),
        }
    }
}

fn announce(scope: UploadScope, file: FileDescriptor) -> Request {
    match scope {
        UploadScope::Room => Request::File { file },
        UploadScope::Private { peer } => Request::PrivateFile { peer, file },
    }
}

fn check_peer(peer: &str) -> Result<(), SessionError> {
    if peer.trim().is_empty() {
        return Err(CoreError::InvalidName { what: "peer", value: peer.to_string() }.into());
    }
    Ok(CoreError::check_name("peer", peer)?)
}

fn non_empty_text(text: &str) -> Result<String, SessionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SessionError::EmptyMessage);
    }
    check_delimiter("message", text)?;
    Ok(text.to_string())
}

fn check_delimiter(what: &'static str, value: &str) -> Result<(), SessionError> {
    if value.contains(pipechat_proto::DELIMITER) {
        return Err(SessionError::ContainsDelimiter { what });
    }
    Ok(())
}

fn preview(body: &Body) -> String {
    match body {
        Body::Text(text) => text.clone(),
        Body::File(file) => format!("{} ({})", file.name, format_size(file.size_bytes)),
    }
}

fn icon(body: &Body, text_icon: &str) -> String {
    match body {
        Body::Text(_) => text_icon.to_string(),
        Body::File(_) => "📎".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pipechat_core::{NotificationPermission, TimelineEntry, env::test_utils::MockEnv};
    use pipechat_proto::FileKind;

    use super::*;

    fn connected(identity: &str) -> (MockEnv, Session<MockEnv>) {
        let env = MockEnv::new();
        let mut session = Session::new(env.clone(), SessionConfig::new(identity)).unwrap();
        session.handle(SessionEvent::Opened).unwrap();
        (env, session)
    }

    fn frame(session: &mut Session<MockEnv>, raw: &str) -> Vec<SessionAction> {
        session.handle(SessionEvent::FrameReceived(raw.into())).unwrap()
    }

    fn sent(actions: &[SessionAction]) -> Vec<String> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Send(request) => Some(request.encode()),
                _ => None,
            })
            .collect()
    }

    fn file() -> FileDescriptor {
        FileDescriptor {
            url: "/api/files/a.png".into(),
            kind: FileKind::Image,
            name: "a.png".into(),
            size_bytes: 2048,
        }
    }

    #[test]
    fn rejects_unusable_identity() {
        let env = MockEnv::new();
        assert!(matches!(
            Session::new(env.clone(), SessionConfig::new("   ")),
            Err(SessionError::InvalidIdentity(_))
        ));
        assert!(matches!(
            Session::new(env, SessionConfig::new("a|b")),
            Err(SessionError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn opening_requests_room_list() {
        let env = MockEnv::new();
        let mut session = Session::new(env, SessionConfig::new("bob")).unwrap();

        let actions = session.handle(SessionEvent::Opened).unwrap();

        assert_eq!(sent(&actions), ["GET_ROOMS|"]);
        assert_eq!(session.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn outbound_requires_connection() {
        let env = MockEnv::new();
        let mut session = Session::new(env, SessionConfig::new("bob")).unwrap();

        let result = session.handle(SessionEvent::Join { room: "lobby".into(), password: None });

        assert_eq!(result, Err(SessionError::Disconnected));
    }

    #[test]
    fn join_sends_initials_and_password() {
        let (_, mut session) = connected("mary jane");

        let actions = session
            .handle(SessionEvent::Join { room: "vault".into(), password: Some("pw".into()) })
            .unwrap();

        assert_eq!(sent(&actions), ["JOIN|vault|mary jane|MJ|pw"]);
        assert!(actions.contains(&SessionAction::RoomChanged { room: Some("vault".into()) }));
    }

    #[test]
    fn permission_requested_on_first_join_only() {
        let (_, mut session) = connected("bob");

        let first = session.handle(SessionEvent::Join { room: "a".into(), password: None }).unwrap();
        let second =
            session.handle(SessionEvent::Join { room: "b".into(), password: None }).unwrap();

        assert!(first.contains(&SessionAction::RequestNotificationPermission));
        assert!(!second.contains(&SessionAction::RequestNotificationPermission));
    }

    #[test]
    fn create_room_trims_name() {
        let (_, mut session) = connected("bob");

        let actions = session.handle(SessionEvent::CreateRoom { name: "  dev ".into() }).unwrap();

        assert_eq!(sent(&actions), ["JOIN|dev|bob|BO"]);
        assert_eq!(session.timeline().active_room(), Some("dev"));
        assert_eq!(
            session.handle(SessionEvent::CreateRoom { name: " ".into() }),
            Err(SessionError::Core(CoreError::EmptyRoomName))
        );
    }

    #[test]
    fn room_message_needs_active_room_and_text() {
        let (_, mut session) = connected("bob");

        assert_eq!(
            session.handle(SessionEvent::SendRoomMessage { text: "hi".into() }),
            Err(SessionError::NoActiveRoom)
        );

        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();
        assert_eq!(
            session.handle(SessionEvent::SendRoomMessage { text: "   ".into() }),
            Err(SessionError::EmptyMessage)
        );

        let actions =
            session.handle(SessionEvent::SendRoomMessage { text: " hello ".into() }).unwrap();
        assert_eq!(sent(&actions), ["MSG|hello"]);
    }

    #[test]
    fn text_with_delimiter_is_rejected() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        assert_eq!(
            session.handle(SessionEvent::SendRoomMessage { text: "a|b".into() }),
            Err(SessionError::ContainsDelimiter { what: "message" })
        );
        assert_eq!(
            session.handle(SessionEvent::SendPrivateMessage {
                peer: "carol".into(),
                text: "x | y".into()
            }),
            Err(SessionError::ContainsDelimiter { what: "message" })
        );
    }

    #[test]
    fn upload_name_with_delimiter_is_rejected() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        assert_eq!(
            session.begin_upload(UploadScope::Room, "a|b.png", 10),
            Err(SessionError::ContainsDelimiter { what: "file name" })
        );
        assert!(session.uploads().all().is_empty());
    }

    #[test]
    fn private_message_is_recorded_only_on_echo() {
        let (_, mut session) = connected("bob");

        let actions = session
            .handle(SessionEvent::SendPrivateMessage { peer: "carol".into(), text: "hi".into() })
            .unwrap();
        assert_eq!(sent(&actions), ["PRIVATE|carol|hi"]);
        assert!(session.conversations().messages("carol").is_empty());

        frame(&mut session, "PRIVATE_SENT|carol|hi|5");
        let log = session.conversations().messages("carol");
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, "bob");
        assert!(log[0].originated_locally);
    }

    #[test]
    fn error_frame_becomes_error_notice() {
        let (_, mut session) = connected("bob");

        let actions = frame(&mut session, "ERROR|Wrong password");

        assert!(matches!(
            &actions[..],
            [SessionAction::RenderRoom(TimelineEntry::Notice(notice))]
                if notice.kind == NoticeKind::Error && notice.text == "Wrong password"
        ));
    }

    #[test]
    fn own_join_notice_confirms_join() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        frame(&mut session, "SYS|alice joined room");
        assert!(frame(&mut session, "ERROR|nope").contains(&SessionAction::RoomChanged {
            room: None
        }));

        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();
        frame(&mut session, "SYS|bob joined room");
        let actions = frame(&mut session, "ERROR|nope");
        assert_eq!(actions.len(), 1);
        assert_eq!(session.timeline().active_room(), Some("lobby"));
    }

    #[test]
    fn disconnect_drops_pending_join() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();
        session.handle(SessionEvent::Closed { reason: String::new() }).unwrap();

        let actions = frame(&mut session, "ERROR|late");

        assert_eq!(actions.len(), 1);
        assert_eq!(session.timeline().active_room(), Some("lobby"));
    }

    #[test]
    fn deleting_active_room_clears_it() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        let actions = frame(&mut session, "ROOM_DELETED|lobby");

        assert!(actions.contains(&SessionAction::RoomChanged { room: None }));
        assert_eq!(session.timeline().active_room(), None);

        let rejoin =
            session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();
        assert_eq!(sent(&rejoin), ["JOIN|lobby|bob|BO"]);
    }

    #[test]
    fn delete_room_request() {
        let (_, mut session) = connected("bob");

        let actions = session.handle(SessionEvent::DeleteRoom { room: "old".into() }).unwrap();

        assert_eq!(sent(&actions), ["DELETE_ROOM|old"]);
    }

    #[test]
    fn typing_sends_are_coalesced() {
        let (env, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        let first = session.handle(SessionEvent::Keystroke).unwrap();
        env.advance(Duration::from_millis(300));
        let second = session.handle(SessionEvent::Keystroke).unwrap();
        env.advance(Duration::from_millis(700));
        let third = session.handle(SessionEvent::Keystroke).unwrap();

        assert_eq!(sent(&first), ["TYPING|"]);
        assert!(second.is_empty());
        assert_eq!(sent(&third), ["TYPING|"]);
    }

    #[test]
    fn typing_without_room_is_silent() {
        let (_, mut session) = connected("bob");

        assert!(session.handle(SessionEvent::Keystroke).unwrap().is_empty());
    }

    #[test]
    fn typing_indicator_expires_from_latest_notice() {
        let (env, mut session) = connected("bob");

        frame(&mut session, "TYPING|alice");
        env.advance(Duration::from_millis(1500));
        frame(&mut session, "TYPING|alice");
        env.advance(Duration::from_millis(1000));

        // 2.5s after the first notice, 1s after the second: still showing.
        assert!(session.handle(SessionEvent::Tick { now: env.now() }).unwrap().is_empty());
        assert_eq!(session.typing_indicator().as_deref(), Some("alice is typing..."));

        env.advance(Duration::from_millis(1000));
        let actions = session.handle(SessionEvent::Tick { now: env.now() }).unwrap();
        assert_eq!(actions, [SessionAction::TypingIndicator(None)]);
    }

    #[test]
    fn own_typing_echo_is_ignored() {
        let (_, mut session) = connected("bob");

        assert!(frame(&mut session, "TYPING|bob").is_empty());
    }

    #[test]
    fn notification_closes_after_ttl() {
        let (env, mut session) = connected("bob");
        session.handle(SessionEvent::PermissionResolved(NotificationPermission::Granted)).unwrap();
        session.handle(SessionEvent::FocusLost).unwrap();

        let actions = frame(&mut session, "MSG|alice|hello|1");
        let Some(SessionAction::ShowNotification { id, .. }) =
            actions.iter().find(|a| matches!(a, SessionAction::ShowNotification { .. }))
        else {
            unreachable!("room message from another user notifies while unfocused");
        };
        let id = *id;
        assert!(actions.contains(&SessionAction::SetTitle("(1) Pipechat".into())));

        env.advance(NOTIFICATION_TTL);
        let actions = session.handle(SessionEvent::Tick { now: env.now() }).unwrap();
        assert_eq!(actions, [SessionAction::CloseNotification { id }]);

        // Activating after it closed does nothing.
        assert!(session.handle(SessionEvent::NotificationActivated { id }).unwrap().is_empty());
    }

    #[test]
    fn history_never_notifies() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::PermissionResolved(NotificationPermission::Granted)).unwrap();
        session.handle(SessionEvent::FocusLost).unwrap();

        let actions = frame(&mut session, "HISTORY|MSG|alice|old news|1");

        assert_eq!(actions.len(), 1);
        assert_eq!(session.attention().state().badge_count, 0);
    }

    #[test]
    fn upload_lifecycle_sends_one_frame() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        let id = session.begin_upload(UploadScope::Room, "a.png", 2048).unwrap();
        let actions = session.handle(SessionEvent::UploadCompleted { id, file: file() }).unwrap();

        assert_eq!(sent(&actions), ["FILE|/api/files/a.png|image|a.png|2048"]);
        assert_eq!(
            session.handle(SessionEvent::UploadCompleted { id, file: file() }),
            Err(SessionError::UnknownUpload(id))
        );
    }

    #[test]
    fn failed_upload_sends_nothing() {
        let (_, mut session) = connected("bob");
        let scope = UploadScope::Private { peer: "carol".into() };
        let id = session.begin_upload(scope.clone(), "a.png", 10).unwrap();

        let actions = session
            .handle(SessionEvent::UploadFailed { id, reason: "HTTP 500".into() })
            .unwrap();

        assert!(sent(&actions).is_empty());
        assert_eq!(actions, [SessionAction::UploadFailed {
            id,
            scope: scope.clone(),
            reason: "HTTP 500".into()
        }]);
        assert_eq!(session.uploads().in_scope(&scope).count(), 1);
    }

    #[test]
    fn oversize_upload_rejected_before_start() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();

        let result = session.begin_upload(UploadScope::Room, "big.iso", MAX_UPLOAD_BYTES + 1);

        assert_eq!(
            result,
            Err(SessionError::FileTooLarge { size: MAX_UPLOAD_BYTES + 1, limit: MAX_UPLOAD_BYTES })
        );
        assert!(session.uploads().all().is_empty());
    }

    #[test]
    fn upload_finishing_after_disconnect_fails() {
        let (_, mut session) = connected("bob");
        session.handle(SessionEvent::Join { room: "lobby".into(), password: None }).unwrap();
        let id = session.begin_upload(UploadScope::Room, "a.png", 10).unwrap();
        session.handle(SessionEvent::Closed { reason: String::new() }).unwrap();

        let actions = session.handle(SessionEvent::UploadCompleted { id, file: file() }).unwrap();

        assert!(sent(&actions).is_empty());
        assert!(matches!(actions[..], [SessionAction::UploadFailed { .. }]));
    }

    #[test]
    fn close_is_reported_once() {
        let (_, mut session) = connected("bob");

        let first = session.handle(SessionEvent::Closed { reason: "reset".into() }).unwrap();
        let second = session.handle(SessionEvent::Closed { reason: "reset".into() }).unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(session.timeline().entries().len(), 1);
    }

    #[test]
    fn clear_timeline() {
        let (_, mut session) = connected("bob");
        frame(&mut session, "SYS|hello");

        let actions = session.handle(SessionEvent::ClearTimeline).unwrap();

        assert_eq!(actions, [SessionAction::TimelineCleared]);
        assert!(session.timeline().entries().is_empty());
    }

    #[test]
    fn preview_formats_files() {
        assert_eq!(preview(&Body::File(file())), "a.png (2 KB)");
        assert_eq!(icon(&Body::File(file()), "💬"), "📎");
    }
}
