//! Client
//!
//! Action-based session controller for Pipechat. Owns every piece of
//! client-side state for one connection and is the only producer of outbound
//! frames.
//!
//! # Architecture
//!
//! The session follows the Sans-IO and action-based pattern of
//! [`pipechat_core`]. The caller feeds it [`SessionEvent`]s (frames off the
//! wire, user intents, focus changes, clock ticks) and executes the
//! [`SessionAction`]s it returns (send a frame, render a line, show a
//! notification). Nothing in the session blocks or performs I/O.
//!
//! # Components
//!
//! - [`Session`]: Top-level state machine
//! - [`UploadTracker`]: Placeholders for in-flight and failed uploads
//! - [`SessionEvent`]: Events fed into the session
//! - [`SessionAction`]: Actions produced by the session
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::connect`]: WebSocket connection carrying text frames
//! - [`uploader::Uploader`]: HTTP multipart client for the upload endpoint

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod session;
mod upload;

#[cfg(feature = "transport")]
pub mod transport;
#[cfg(feature = "transport")]
pub mod uploader;

pub use error::SessionError;
pub use event::{ConnectionStatus, NotificationId, SessionAction, SessionEvent};
pub use pipechat_core::env::Environment;
pub use session::{MAX_UPLOAD_BYTES, Session, SessionConfig};
pub use upload::{PendingUpload, UploadId, UploadScope, UploadStatus, UploadTracker};
