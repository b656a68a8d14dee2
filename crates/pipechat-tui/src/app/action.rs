//! UI actions
//!
//! Actions produced by the App state machine for the runtime to execute.

use std::path::PathBuf;

use pipechat_client::UploadId;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Send a text frame to the server.
    Send(String),

    /// Read the size of a file, then call [`crate::App::start_upload`].
    PrepareUpload {
        /// File to upload.
        path: PathBuf,
    },

    /// Post a file to the upload endpoint and report back with
    /// [`crate::AppEvent::UploadFinished`].
    Upload {
        /// Placeholder id.
        id: UploadId,
        /// File to upload.
        path: PathBuf,
    },

    /// Set the terminal window title.
    SetTitle(String),
}
