//! Session error types.

use pipechat_core::CoreError;
use thiserror::Error;

use crate::UploadId;

/// Reasons a session operation was refused.
///
/// None of these are fatal. They describe user input the session cannot act
/// on; the caller shows them and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation needs a live connection.
    #[error("not connected to the server")]
    Disconnected,

    /// Operation needs a joined room.
    #[error("join a room first")]
    NoActiveRoom,

    /// Message was empty after trimming.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// Text or file name contains the frame delimiter. The server splits on
    /// `|` and keeps only the first piece of such a field.
    #[error("{what} cannot contain '|'")]
    ContainsDelimiter {
        /// Kind of field (message, file name).
        what: &'static str,
    },

    /// Identity is unusable.
    #[error("invalid identity: {0:?}")]
    InvalidIdentity(String),

    /// File exceeds the upload limit.
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge {
        /// File size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Upload completion or failure for an id the session never issued, or
    /// that already finished.
    #[error("unknown upload {0}")]
    UnknownUpload(UploadId),

    /// State component rejected the input.
    #[error(transparent)]
    Core(#[from] CoreError),
}
