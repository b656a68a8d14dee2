//! Inbound frame decoding.
//!
//! [`Event::decode`] is the only entry point the client needs: it is total,
//! so every string (including garbage) yields some [`Event`]. Frames that
//! cannot be understood become [`Event::Discard`] carrying the reason, which
//! the caller logs and otherwise ignores.
//!
//! # Field Splitting
//!
//! Free-text fields sit between fixed fields, so they are recovered by
//! splitting fixed fields off both ends:
//!
//! - Text posts (`MSG`, `PRIVATE`, `PRIVATE_SENT`): sender from the front,
//!   timestamp from the back, body is everything in between.
//! - File posts (`FILE`, `PRIVATE_FILE`, `PRIVATE_FILE_SENT`): sender, url
//!   and kind from the front, timestamp and size from the back, file name in
//!   between.
//! - Snapshots (`USERS`, `ROOMS`) and notices (`SYS`, `ERROR`): the whole
//!   remainder is one field.

use std::fmt;

use crate::{
    DELIMITER, Opcode,
    errors::{ProtocolError, Result},
    payloads::{RoomInfo, RosterUser},
};

/// Kind of an uploaded file, as reported by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Renderable image.
    Image,
    /// Playable video.
    Video,
    /// Anything else. Keeps the server's tag (`audio`, `document`, `file`).
    Other(String),
}

impl FileKind {
    /// Parse the kind tag used on the wire and by the upload endpoint.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "image" => Self::Image,
            "video" => Self::Video,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared file announced in a room or private conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Download URL returned by the upload endpoint.
    pub url: String,
    /// Rendering kind.
    pub kind: FileKind,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Message body: plain text or a shared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Text message.
    Text(String),
    /// File announcement.
    File(FileDescriptor),
}

/// A timestamped post as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Author of a room post. For private posts this is the other party,
    /// regardless of [`Direction`].
    pub sender: String,
    /// Post contents.
    pub body: Body,
    /// Server timestamp in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Direction of a private post relative to the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the peer to us (`PRIVATE`, `PRIVATE_FILE`).
    Incoming,
    /// Echo of a post we sent (`PRIVATE_SENT`, `PRIVATE_FILE_SENT`).
    Outgoing,
}

/// Typed decoding of an inbound frame.
///
/// # Invariants
///
/// - Self-contained: every variant carries all fields needed to render it.
///   The raw frame is never consulted after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `SYS|<text>`: informational notice.
    SystemNotice {
        /// Notice text.
        text: String,
    },
    /// `ERROR|<text>`: server rejected a request.
    ServerError {
        /// Error text.
        text: String,
    },
    /// `ROOM_DELETED|<room>`: a room was deleted by its members.
    RoomDeleted {
        /// Deleted room name.
        room: String,
    },
    /// `MSG|<sender>|<text>|<ts>`: live room message. Body is text.
    RoomMessage(Post),
    /// `FILE|<sender>|<url>|<kind>|<name>|<size>|<ts>`: live room file.
    RoomFileMessage(Post),
    /// `HISTORY|MSG|...` or `HISTORY|FILE|...`: replayed room post.
    HistoryMessage(Post),
    /// `PRIVATE|...` or `PRIVATE_SENT|...`: private text message.
    PrivateMessage {
        /// Whether we sent or received it.
        direction: Direction,
        /// The post; `sender` is the other party.
        post: Post,
    },
    /// `PRIVATE_FILE|...` or `PRIVATE_FILE_SENT|...`: private file.
    PrivateFileMessage {
        /// Whether we sent or received it.
        direction: Direction,
        /// The post; `sender` is the other party.
        post: Post,
    },
    /// `USERS|<json>`: full replacement roster for the current room.
    RosterSnapshot(Vec<RosterUser>),
    /// `ROOMS|<json>`: full replacement room list.
    RoomListSnapshot(Vec<RoomInfo>),
    /// `TYPING|<sender>`: someone in the room is typing.
    TypingNotice {
        /// Who is typing.
        sender: String,
    },
    /// Frame could not be understood and must be ignored.
    Discard {
        /// Why the frame was discarded.
        reason: ProtocolError,
    },
}

impl Event {
    /// Decode a raw frame. Never fails: malformed or unknown frames become
    /// [`Event::Discard`].
    pub fn decode(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|reason| Self::Discard { reason })
    }

    /// Decode a raw frame, reporting why it was rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let (tag, rest) = raw.split_once(DELIMITER).ok_or(ProtocolError::MissingDelimiter)?;
        let opcode =
            Opcode::from_tag(tag).ok_or_else(|| ProtocolError::UnknownOpcode(tag.to_string()))?;

        match opcode {
            Opcode::Sys => Ok(Self::SystemNotice { text: rest.to_string() }),
            Opcode::Error => Ok(Self::ServerError { text: rest.to_string() }),
            Opcode::RoomDeleted => {
                Ok(Self::RoomDeleted { room: non_empty(opcode, "room", rest)?.to_string() })
            },
            Opcode::Msg => text_post(opcode, rest).map(Self::RoomMessage),
            Opcode::File => file_post(opcode, rest).map(Self::RoomFileMessage),
            Opcode::History => history_post(rest).map(Self::HistoryMessage),
            Opcode::Private => text_post(opcode, rest)
                .map(|post| Self::PrivateMessage { direction: Direction::Incoming, post }),
            Opcode::PrivateSent => text_post(opcode, rest)
                .map(|post| Self::PrivateMessage { direction: Direction::Outgoing, post }),
            Opcode::PrivateFile => file_post(opcode, rest)
                .map(|post| Self::PrivateFileMessage { direction: Direction::Incoming, post }),
            Opcode::PrivateFileSent => file_post(opcode, rest)
                .map(|post| Self::PrivateFileMessage { direction: Direction::Outgoing, post }),
            Opcode::Users => json(opcode, rest).map(Self::RosterSnapshot),
            Opcode::Rooms => json(opcode, rest).map(Self::RoomListSnapshot),
            Opcode::Typing => {
                Ok(Self::TypingNotice { sender: non_empty(opcode, "sender", rest)?.to_string() })
            },
            Opcode::Join | Opcode::GetRooms | Opcode::DeleteRoom => {
                Err(ProtocolError::UnexpectedOpcode(opcode))
            },
        }
    }
}

/// `sender|body...|ts`
fn text_post(opcode: Opcode, rest: &str) -> Result<Post> {
    const FIELDS: usize = 3;

    let missing = || ProtocolError::MissingFields { opcode, expected: FIELDS };
    let (sender, tail) = rest.split_once(DELIMITER).ok_or_else(missing)?;
    let (body, ts) = tail.rsplit_once(DELIMITER).ok_or_else(missing)?;

    Ok(Post {
        sender: non_empty(opcode, "sender", sender)?.to_string(),
        body: Body::Text(body.to_string()),
        timestamp: number(opcode, "timestamp", ts)?,
    })
}

/// `sender|url|kind|name...|size|ts`
fn file_post(opcode: Opcode, rest: &str) -> Result<Post> {
    const FIELDS: usize = 6;

    let missing = || ProtocolError::MissingFields { opcode, expected: FIELDS };

    let mut front = rest.splitn(4, DELIMITER);
    let (Some(sender), Some(url), Some(kind), Some(tail)) =
        (front.next(), front.next(), front.next(), front.next())
    else {
        return Err(missing());
    };

    let mut back = tail.rsplitn(3, DELIMITER);
    let (Some(ts), Some(size), Some(name)) = (back.next(), back.next(), back.next()) else {
        return Err(missing());
    };

    let file = FileDescriptor {
        url: non_empty(opcode, "url", url)?.to_string(),
        kind: FileKind::from_tag(kind),
        name: name.to_string(),
        size_bytes: number(opcode, "size", size)?,
    };

    Ok(Post {
        sender: non_empty(opcode, "sender", sender)?.to_string(),
        body: Body::File(file),
        timestamp: number(opcode, "timestamp", ts)?,
    })
}

/// `MSG|...` or `FILE|...` after the `HISTORY|` prefix.
fn history_post(rest: &str) -> Result<Post> {
    let (inner, fields) = rest
        .split_once(DELIMITER)
        .ok_or(ProtocolError::MissingFields { opcode: Opcode::History, expected: 4 })?;

    match Opcode::from_tag(inner) {
        Some(Opcode::Msg) => text_post(Opcode::History, fields),
        Some(Opcode::File) => file_post(Opcode::History, fields),
        _ => Err(ProtocolError::UnsupportedHistory(inner.to_string())),
    }
}

fn json<T: serde::de::DeserializeOwned>(opcode: Opcode, rest: &str) -> Result<T> {
    serde_json::from_str(rest)
        .map_err(|e| ProtocolError::InvalidJson { opcode, reason: e.to_string() })
}

fn number(opcode: Opcode, field: &'static str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| ProtocolError::InvalidNumber {
        opcode,
        field,
        value: value.to_string(),
    })
}

fn non_empty<'a>(opcode: Opcode, field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() { Err(ProtocolError::EmptyField { opcode, field }) } else { Ok(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(sender: &str, body: &str, timestamp: u64) -> Post {
        Post { sender: sender.into(), body: Body::Text(body.into()), timestamp }
    }

    #[test]
    fn room_message() {
        assert_eq!(
            Event::decode("MSG|alice|hello|1700000000000"),
            Event::RoomMessage(text("alice", "hello", 1_700_000_000_000))
        );
    }

    #[test]
    fn message_body_keeps_delimiters() {
        assert_eq!(
            Event::decode("MSG|alice|a|b|c|42"),
            Event::RoomMessage(text("alice", "a|b|c", 42))
        );
    }

    #[test]
    fn empty_body_is_allowed() {
        assert_eq!(Event::decode("MSG|alice||42"), Event::RoomMessage(text("alice", "", 42)));
    }

    #[test]
    fn history_wraps_message() {
        assert_eq!(
            Event::decode("HISTORY|MSG|bob|hi there|1700000000123"),
            Event::HistoryMessage(text("bob", "hi there", 1_700_000_000_123))
        );
    }

    #[test]
    fn history_body_keeps_delimiters() {
        assert_eq!(
            Event::decode("HISTORY|MSG|bob|x|y|7"),
            Event::HistoryMessage(text("bob", "x|y", 7))
        );
    }

    #[test]
    fn history_wraps_file() {
        let event = Event::decode("HISTORY|FILE|bob|/api/files/a.png|image|a.png|2048|9");
        let Event::HistoryMessage(post) = event else {
            panic!("expected history message, got {event:?}");
        };
        assert_eq!(post.sender, "bob");
        assert!(matches!(post.body, Body::File(FileDescriptor { kind: FileKind::Image, .. })));
    }

    #[test]
    fn history_of_unsupported_type_is_discarded() {
        assert_eq!(
            Event::decode("HISTORY|SYS|hello"),
            Event::Discard { reason: ProtocolError::UnsupportedHistory("SYS".into()) }
        );
    }

    #[test]
    fn file_message_fields() {
        let event = Event::decode("FILE|carol|/api/files/x.pdf|document|report|v2.pdf|1536|5");
        assert_eq!(
            event,
            Event::RoomFileMessage(Post {
                sender: "carol".into(),
                body: Body::File(FileDescriptor {
                    url: "/api/files/x.pdf".into(),
                    kind: FileKind::Other("document".into()),
                    name: "report|v2.pdf".into(),
                    size_bytes: 1536,
                }),
                timestamp: 5,
            })
        );
    }

    #[test]
    fn private_directions() {
        assert_eq!(
            Event::decode("PRIVATE|carol|hey|100"),
            Event::PrivateMessage { direction: Direction::Incoming, post: text("carol", "hey", 100) }
        );
        assert_eq!(
            Event::decode("PRIVATE_SENT|carol|yo|101"),
            Event::PrivateMessage { direction: Direction::Outgoing, post: text("carol", "yo", 101) }
        );
    }

    #[test]
    fn private_file_directions() {
        let incoming = Event::decode("PRIVATE_FILE|dave|/f/1|video|clip.mp4|10|1");
        let outgoing = Event::decode("PRIVATE_FILE_SENT|dave|/f/1|video|clip.mp4|10|2");

        assert!(matches!(incoming, Event::PrivateFileMessage {
            direction: Direction::Incoming,
            ..
        }));
        assert!(matches!(outgoing, Event::PrivateFileMessage {
            direction: Direction::Outgoing,
            ..
        }));
    }

    #[test]
    fn roster_snapshot() {
        let event =
            Event::decode(r#"USERS|[{"username":"x","avatar":"X","uniqueId":"1","ip":"10.0.0.1"}]"#);
        let Event::RosterSnapshot(users) = event else {
            panic!("expected roster snapshot, got {event:?}");
        };
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "x");

        assert_eq!(Event::decode("USERS|[]"), Event::RosterSnapshot(vec![]));
    }

    #[test]
    fn room_list_snapshot() {
        let event = Event::decode(r#"ROOMS|[{"name":"lobby","count":2}]"#);
        assert_eq!(
            event,
            Event::RoomListSnapshot(vec![RoomInfo {
                name: "lobby".into(),
                count: 2,
                has_password: false
            }])
        );
    }

    #[test]
    fn notices() {
        assert_eq!(
            Event::decode("SYS|bob joined room"),
            Event::SystemNotice { text: "bob joined room".into() }
        );
        assert_eq!(Event::decode("ERROR|bad|pw"), Event::ServerError { text: "bad|pw".into() });
        assert_eq!(Event::decode("ROOM_DELETED|lobby"), Event::RoomDeleted {
            room: "lobby".into()
        });
    }

    #[test]
    fn typing_notice() {
        assert_eq!(Event::decode("TYPING|alice"), Event::TypingNotice { sender: "alice".into() });
        assert!(matches!(Event::decode("TYPING|"), Event::Discard { .. }));
    }

    #[test]
    fn trailing_newline_is_ignored() {
        assert_eq!(
            Event::decode("MSG|alice|hello|1\r\n"),
            Event::RoomMessage(text("alice", "hello", 1))
        );
    }

    #[test]
    fn garbage_without_delimiter_is_discarded() {
        assert_eq!(Event::decode("garbage-no-pipe"), Event::Discard {
            reason: ProtocolError::MissingDelimiter
        });
    }

    #[test]
    fn unknown_type_is_discarded() {
        assert_eq!(Event::decode("PING|now"), Event::Discard {
            reason: ProtocolError::UnknownOpcode("PING".into())
        });
    }

    #[test]
    fn client_only_type_is_discarded() {
        assert_eq!(Event::decode("JOIN|lobby|bob|BO"), Event::Discard {
            reason: ProtocolError::UnexpectedOpcode(Opcode::Join)
        });
    }

    #[test]
    fn missing_fields_are_discarded() {
        assert_eq!(Event::decode("MSG|alice"), Event::Discard {
            reason: ProtocolError::MissingFields { opcode: Opcode::Msg, expected: 3 }
        });
        assert_eq!(Event::decode("FILE|a|b|c|d"), Event::Discard {
            reason: ProtocolError::MissingFields { opcode: Opcode::File, expected: 6 }
        });
    }

    #[test]
    fn bad_numbers_are_discarded() {
        assert!(matches!(
            Event::decode("MSG|alice|hi|yesterday"),
            Event::Discard { reason: ProtocolError::InvalidNumber { field: "timestamp", .. } }
        ));
        assert!(matches!(
            Event::decode("FILE|a|/u|image|n.png|big|1"),
            Event::Discard { reason: ProtocolError::InvalidNumber { field: "size", .. } }
        ));
    }

    #[test]
    fn bad_json_is_discarded() {
        assert!(matches!(
            Event::decode("USERS|[{"),
            Event::Discard { reason: ProtocolError::InvalidJson { opcode: Opcode::Users, .. } }
        ));
    }

    #[test]
    fn file_kind_tags() {
        assert_eq!(FileKind::from_tag("image"), FileKind::Image);
        assert_eq!(FileKind::from_tag("video"), FileKind::Video);
        assert_eq!(FileKind::from_tag("audio").as_str(), "audio");
    }
}
