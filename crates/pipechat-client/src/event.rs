//! Session events and actions.

use std::fmt;

use pipechat_core::{Message, Notification, NotificationPermission, TimelineEntry};
use pipechat_proto::{FileDescriptor, Request};

use crate::{UploadId, UploadScope};

/// Identifies one shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub(crate) u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of the duplex connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not yet open.
    Connecting,
    /// Open.
    Connected,
    /// Closed. There is no automatic reconnect.
    Disconnected,
}

/// Events the caller feeds into the session.
///
/// The caller is responsible for:
/// - Forwarding transport lifecycle and frames
/// - Driving time forward via ticks
/// - Forwarding user intents, focus changes and upload outcomes
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and virtual clocks in tests.
#[derive(Debug, Clone)]
pub enum SessionEvent<I = std::time::Instant> {
    /// Transport connected.
    Opened,

    /// Raw text frame received from the server.
    FrameReceived(String),

    /// Transport closed or failed.
    Closed {
        /// Human-readable cause.
        reason: String,
    },

    /// Time tick for timer expiry.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// Window gained focus.
    FocusGained,

    /// Window lost focus.
    FocusLost,

    /// Presenter answered the permission prompt.
    PermissionResolved(NotificationPermission),

    /// User activated a shown notification.
    NotificationActivated {
        /// Notification that was activated.
        id: NotificationId,
    },

    /// Join (switch to) a room.
    Join {
        /// Room name, used verbatim.
        room: String,
        /// Room password.
        password: Option<String>,
    },

    /// Create a room from user input. Whitespace is trimmed.
    CreateRoom {
        /// Room name.
        name: String,
    },

    /// Ask the server to delete a room.
    DeleteRoom {
        /// Room name.
        room: String,
    },

    /// Send a message to the active room.
    SendRoomMessage {
        /// Message text.
        text: String,
    },

    /// Send a private message.
    SendPrivateMessage {
        /// Recipient.
        peer: String,
        /// Message text.
        text: String,
    },

    /// Open the private conversation view for a peer.
    OpenConversation {
        /// Peer to open.
        peer: String,
    },

    /// Close the open private conversation view.
    CloseConversation,

    /// User typed in the room composer.
    Keystroke,

    /// Upload finished; announce the file.
    UploadCompleted {
        /// Upload that finished.
        id: UploadId,
        /// Descriptor returned by the upload endpoint.
        file: FileDescriptor,
    },

    /// Upload failed.
    UploadFailed {
        /// Upload that failed.
        id: UploadId,
        /// Why it failed.
        reason: String,
    },

    /// Announce a file that was uploaded elsewhere.
    AnnounceFile {
        /// Where to announce it.
        scope: UploadScope,
        /// Uploaded file.
        file: FileDescriptor,
    },

    /// Drop every line from the room view.
    ClearTimeline,
}

/// Actions the session produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send a frame to the server.
    Send(Request),

    /// Append a line to the room view.
    RenderRoom(TimelineEntry),

    /// Append a message to the open private view.
    RenderPrivate {
        /// Peer whose view is open.
        peer: String,
        /// Message to append.
        message: Message,
    },

    /// Private view opened; render its full log.
    ConversationOpened {
        /// Peer whose view opened.
        peer: String,
        /// Full log, oldest first.
        messages: Vec<Message>,
    },

    /// Private view closed.
    ConversationClosed {
        /// Peer whose view closed.
        peer: String,
    },

    /// Unread badge for a peer changed.
    UnreadChanged {
        /// Peer.
        peer: String,
        /// New count.
        count: u32,
    },

    /// User snapshot replaced.
    RosterChanged,

    /// Room snapshot replaced.
    RoomsChanged,

    /// Active room changed. `None` after the active room was deleted.
    RoomChanged {
        /// New active room.
        room: Option<String>,
    },

    /// Room view emptied.
    TimelineCleared,

    /// Present a desktop notification.
    ShowNotification {
        /// Id to report back on activation.
        id: NotificationId,
        /// What to show.
        notification: Notification,
    },

    /// Dismiss a notification.
    CloseNotification {
        /// Notification to dismiss.
        id: NotificationId,
    },

    /// Set the window title.
    SetTitle(String),

    /// Show (`Some`) or hide (`None`) the typing indicator.
    TypingIndicator(Option<String>),

    /// Prompt the user for notification permission, then report back with
    /// [`SessionEvent::PermissionResolved`].
    RequestNotificationPermission,

    /// Connection state changed.
    ConnectionChanged(ConnectionStatus),

    /// Upload failed; its placeholder now shows the error.
    UploadFailed {
        /// Upload that failed.
        id: UploadId,
        /// View the placeholder lives in.
        scope: UploadScope,
        /// Why it failed.
        reason: String,
    },
}
