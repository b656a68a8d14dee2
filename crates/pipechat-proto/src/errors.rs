//! Protocol error types.
//!
//! Errors describe why a frame could not be decoded. They never escape the
//! total decoder: [`crate::Event::decode`] folds them into
//! [`crate::Event::Discard`] so the reason can be logged.

use thiserror::Error;

use crate::Opcode;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Reasons a frame was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame has no `|` separating the type tag from its fields.
    #[error("frame has no type delimiter")]
    MissingDelimiter,

    /// Type tag is not part of the protocol.
    #[error("unknown frame type: {0:?}")]
    UnknownOpcode(String),

    /// Type tag is valid but only flows from client to server.
    #[error("frame type {0} is not sent by the server")]
    UnexpectedOpcode(Opcode),

    /// Frame has fewer fields than its type requires.
    #[error("{opcode} frame requires {expected} fields")]
    MissingFields {
        /// Frame type being decoded.
        opcode: Opcode,
        /// Number of fields the type requires.
        expected: usize,
    },

    /// A required field is empty.
    #[error("{opcode} frame has an empty {field}")]
    EmptyField {
        /// Frame type being decoded.
        opcode: Opcode,
        /// Name of the empty field.
        field: &'static str,
    },

    /// A numeric field could not be parsed.
    #[error("{opcode} frame has invalid {field}: {value:?}")]
    InvalidNumber {
        /// Frame type being decoded.
        opcode: Opcode,
        /// Name of the numeric field.
        field: &'static str,
        /// Raw field contents.
        value: String,
    },

    /// JSON snapshot payload could not be parsed.
    #[error("{opcode} frame has invalid JSON: {reason}")]
    InvalidJson {
        /// Frame type being decoded.
        opcode: Opcode,
        /// Parser error message.
        reason: String,
    },

    /// `HISTORY` frame wraps a type that is never replayed.
    #[error("HISTORY cannot wrap {0:?}")]
    UnsupportedHistory(String),
}
