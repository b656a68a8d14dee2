//! Pipechat Protocol
//!
//! Text wire format spoken between a Pipechat client and the chat server.
//!
//! # Frame Format
//!
//! Every frame is one UTF-8 line of the form `TYPE|field1|field2|...`. The
//! `TYPE` tag selects an [`Opcode`]; the remaining fields are split per type.
//! The server splits every field on `|`, so no field may contain it. Inbound
//! decoding still keeps a stray `|` inside message text rather than
//! discarding the frame.
//!
//! # Components
//!
//! - [`Opcode`]: Closed set of frame type tags
//! - [`Event`]: Typed decoding of an inbound frame (total, never fails)
//! - [`Request`]: Outbound frame built by the client
//! - [`payloads`]: JSON bodies of `USERS` and `ROOMS` snapshots
//!
//! # Forward Compatibility
//!
//! The protocol carries no version. Unknown tags and malformed frames decode
//! to [`Event::Discard`] instead of an error, so a newer server never breaks
//! an older client.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod event;
pub mod opcode;
pub mod payloads;
pub mod request;

pub use errors::{ProtocolError, Result};
pub use event::{Body, Direction, Event, FileDescriptor, FileKind, Post};
pub use opcode::Opcode;
pub use payloads::{RoomInfo, RosterUser};
pub use request::Request;

/// Field separator used by every frame.
pub const DELIMITER: char = '|';
