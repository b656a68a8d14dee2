//! HTTP client for the upload endpoint.
//!
//! Files travel out of band: the client posts the bytes as a multipart form
//! with a single `file` part, the server answers with where it stored them,
//! and only then is a file frame announced on the socket. The uploader does
//! the HTTP half; announcing is the session's job.

use std::path::Path;

use pipechat_proto::{FileDescriptor, FileKind};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::MAX_UPLOAD_BYTES;

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Local file could not be read.
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    /// File exceeds the limit; nothing was sent.
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge {
        /// File size.
        size: u64,
        /// Limit.
        limit: u64,
    },

    /// Request failed or returned a non-success status.
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server accepted the request but refused the file.
    #[error("upload rejected by server")]
    Rejected,
}

/// Body the endpoint answers with.
#[derive(Debug, Deserialize)]
struct UploadReceipt {
    #[serde(default = "accepted")]
    success: bool,
    url: String,
    #[serde(rename = "type")]
    kind: String,
    size: u64,
}

fn accepted() -> bool {
    true
}

/// Posts files to the upload endpoint.
#[derive(Debug, Clone)]
pub struct Uploader {
    http: reqwest::Client,
    endpoint: String,
}

impl Uploader {
    /// Uploader for `endpoint`, e.g. `http://host:8080/api/files/upload`.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    /// Upload a file from disk.
    ///
    /// The announced name is the local file name; the server picks its own
    /// storage name and returns it in the url.
    pub async fn upload(&self, path: &Path) -> Result<FileDescriptor, UploadError> {
        let size = tokio::fs::metadata(path).await?.len();
        check_size(size)?;

        let name = path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());
        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(name, bytes).await
    }

    /// Upload an in-memory file under `name`.
    pub async fn upload_bytes(
        &self,
        name: String,
        bytes: Vec<u8>,
    ) -> Result<FileDescriptor, UploadError> {
        check_size(bytes.len() as u64)?;
        tracing::debug!(endpoint = %self.endpoint, %name, size = bytes.len(), "uploading");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(name.clone()));
        let receipt: UploadReceipt = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !receipt.success {
            return Err(UploadError::Rejected);
        }
        tracing::debug!(url = %receipt.url, "upload stored");

        Ok(FileDescriptor {
            url: receipt.url,
            kind: FileKind::from_tag(&receipt.kind),
            name,
            size_bytes: receipt.size,
        })
    }
}

fn check_size(size: u64) -> Result<(), UploadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size, limit: MAX_UPLOAD_BYTES });
    }
    Ok(())
}
