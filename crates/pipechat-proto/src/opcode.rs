//! Frame type tags.

use std::fmt;

/// Frame type tag (the `TYPE` before the first `|`).
///
/// # Invariants
///
/// - Tag Uniqueness: `from_tag(op.as_str()) == Some(op)` for every variant.
///   Both directions use exhaustive matches, so adding a variant is a
///   compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Join (and switch to) a room. Client only.
    Join,
    /// Room chat message.
    Msg,
    /// Private message (incoming when sent by the server).
    Private,
    /// Echo of a private message the local user sent.
    PrivateSent,
    /// Room file announcement.
    File,
    /// Private file announcement (incoming when sent by the server).
    PrivateFile,
    /// Echo of a private file the local user sent.
    PrivateFileSent,
    /// Typing notification.
    Typing,
    /// Request the room list. Client only.
    GetRooms,
    /// Delete a room. Client only.
    DeleteRoom,
    /// System notice from the server.
    Sys,
    /// Error notice from the server.
    Error,
    /// Replayed room history entry.
    History,
    /// Full snapshot of users in the current room.
    Users,
    /// Full snapshot of rooms on the server.
    Rooms,
    /// A room was deleted.
    RoomDeleted,
}

impl Opcode {
    /// Parse a wire tag. `None` for tags outside the protocol.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "JOIN" => Some(Self::Join),
            "MSG" => Some(Self::Msg),
            "PRIVATE" => Some(Self::Private),
            "PRIVATE_SENT" => Some(Self::PrivateSent),
            "FILE" => Some(Self::File),
            "PRIVATE_FILE" => Some(Self::PrivateFile),
            "PRIVATE_FILE_SENT" => Some(Self::PrivateFileSent),
            "TYPING" => Some(Self::Typing),
            "GET_ROOMS" => Some(Self::GetRooms),
            "DELETE_ROOM" => Some(Self::DeleteRoom),
            "SYS" => Some(Self::Sys),
            "ERROR" => Some(Self::Error),
            "HISTORY" => Some(Self::History),
            "USERS" => Some(Self::Users),
            "ROOMS" => Some(Self::Rooms),
            "ROOM_DELETED" => Some(Self::RoomDeleted),
            _ => None,
        }
    }

    /// Wire tag for this opcode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Join => "JOIN",
            Self::Msg => "MSG",
            Self::Private => "PRIVATE",
            Self::PrivateSent => "PRIVATE_SENT",
            Self::File => "FILE",
            Self::PrivateFile => "PRIVATE_FILE",
            Self::PrivateFileSent => "PRIVATE_FILE_SENT",
            Self::Typing => "TYPING",
            Self::GetRooms => "GET_ROOMS",
            Self::DeleteRoom => "DELETE_ROOM",
            Self::Sys => "SYS",
            Self::Error => "ERROR",
            Self::History => "HISTORY",
            Self::Users => "USERS",
            Self::Rooms => "ROOMS",
            Self::RoomDeleted => "ROOM_DELETED",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
