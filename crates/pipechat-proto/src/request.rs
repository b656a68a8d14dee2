//! Outbound frames built by the client.

use std::fmt;

use crate::{DELIMITER, FileDescriptor, Opcode};

/// A frame the client sends to the server.
///
/// Field values are written verbatim. The server splits on `|` and reads each
/// field by position, so a `|` inside any field cuts it short. Callers reject
/// names and text containing the delimiter before building a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `JOIN|<room>|<identity>|<initials>[|<password>]`
    Join {
        /// Room to join.
        room: String,
        /// Local identity.
        identity: String,
        /// Avatar initials shown to other members.
        initials: String,
        /// Room password, if any.
        password: Option<String>,
    },
    /// `MSG|<text>`
    Message {
        /// Message body.
        text: String,
    },
    /// `PRIVATE|<peer>|<text>`
    Private {
        /// Recipient.
        peer: String,
        /// Message body.
        text: String,
    },
    /// `FILE|<url>|<kind>|<name>|<size>`
    File {
        /// Uploaded file.
        file: FileDescriptor,
    },
    /// `PRIVATE_FILE|<peer>|<url>|<kind>|<name>|<size>`
    PrivateFile {
        /// Recipient.
        peer: String,
        /// Uploaded file.
        file: FileDescriptor,
    },
    /// `TYPING|`
    Typing,
    /// `GET_ROOMS|`
    GetRooms,
    /// `DELETE_ROOM|<room>`
    DeleteRoom {
        /// Room to delete.
        room: String,
    },
}

impl Request {
    /// Frame type of this request.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Join { .. } => Opcode::Join,
            Self::Message { .. } => Opcode::Msg,
            Self::Private { .. } => Opcode::Private,
            Self::File { .. } => Opcode::File,
            Self::PrivateFile { .. } => Opcode::PrivateFile,
            Self::Typing => Opcode::Typing,
            Self::GetRooms => Opcode::GetRooms,
            Self::DeleteRoom { .. } => Opcode::DeleteRoom,
        }
    }

    /// Encode to a wire frame.
    pub fn encode(&self) -> String {
        let fields = match self {
            Self::Join { room, identity, initials, password } => {
                let mut fields = vec![room.clone(), identity.clone(), initials.clone()];
                if let Some(password) = password.as_ref().filter(|p| !p.is_empty()) {
                    fields.push(password.clone());
                }
                fields
            },
            Self::Message { text } => vec![text.clone()],
            Self::Private { peer, text } => vec![peer.clone(), text.clone()],
            Self::File { file } => file_fields(file),
            Self::PrivateFile { peer, file } => {
                let mut fields = vec![peer.clone()];
                fields.extend(file_fields(file));
                fields
            },
            // Field-less frames still carry the delimiter.
            Self::Typing | Self::GetRooms => vec![String::new()],
            Self::DeleteRoom { room } => vec![room.clone()],
        };

        let mut frame = self.opcode().as_str().to_string();
        for field in fields {
            frame.push(DELIMITER);
            frame.push_str(&field);
        }
        frame
    }
}

fn file_fields(file: &FileDescriptor) -> Vec<String> {
    vec![
        file.url.clone(),
        file.kind.as_str().to_string(),
        file.name.clone(),
        file.size_bytes.to_string(),
    ]
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
