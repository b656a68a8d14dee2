//! Error types for client-side state.

use thiserror::Error;

/// Errors raised by state components when given unusable input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Room name was empty after trimming.
    #[error("room name cannot be empty")]
    EmptyRoomName,

    /// Name contains the frame delimiter and would corrupt the frame.
    #[error("{what} cannot contain '|': {value:?}")]
    InvalidName {
        /// Kind of name (room, peer, identity).
        what: &'static str,
        /// Offending value.
        value: String,
    },
}

impl CoreError {
    /// Reject names the wire format cannot carry.
    pub fn check_name(what: &'static str, value: &str) -> Result<(), Self> {
        if value.contains(pipechat_proto::DELIMITER) {
            return Err(Self::InvalidName { what, value: value.to_string() });
        }
        Ok(())
    }
}
