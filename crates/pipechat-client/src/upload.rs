//! Upload placeholders.
//!
//! An upload runs outside the session (it is the only suspending operation),
//! so the session keeps a placeholder for each one. The placeholder is shown
//! in the view that started the upload. On success it is removed and exactly
//! one file frame is sent; on failure it stays, marked failed, until
//! dismissed. Failures are never retried.

use std::fmt;

/// Identifies one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadId(u64);

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an uploaded file will be announced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UploadScope {
    /// The active room.
    Room,
    /// A private conversation.
    Private {
        /// Recipient.
        peer: String,
    },
}

/// Progress of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// Request in flight.
    Uploading,
    /// Request failed. Nothing was announced.
    Failed {
        /// Why it failed.
        reason: String,
    },
}

/// Placeholder for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Upload id.
    pub id: UploadId,
    /// Originating view.
    pub scope: UploadScope,
    /// Local file name.
    pub name: String,
    /// Local file size.
    pub size_bytes: u64,
    /// Progress.
    pub status: UploadStatus,
}

/// Placeholders for every upload the session started.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    next_id: u64,
    uploads: Vec<PendingUpload>,
}

impl UploadTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an in-flight placeholder.
    pub fn start(&mut self, scope: UploadScope, name: impl Into<String>, size_bytes: u64) -> UploadId {
        let id = UploadId(self.next_id);
        self.next_id += 1;
        self.uploads.push(PendingUpload {
            id,
            scope,
            name: name.into(),
            size_bytes,
            status: UploadStatus::Uploading,
        });
        id
    }

    /// Remove an in-flight placeholder on success. `None` if unknown or
    /// already failed.
    pub fn complete(&mut self, id: UploadId) -> Option<PendingUpload> {
        let index = self
            .uploads
            .iter()
            .position(|u| u.id == id && u.status == UploadStatus::Uploading)?;
        Some(self.uploads.remove(index))
    }

    /// Mark an in-flight placeholder failed. `None` if unknown or already
    /// failed.
    pub fn fail(&mut self, id: UploadId, reason: impl Into<String>) -> Option<&PendingUpload> {
        let upload =
            self.uploads.iter_mut().find(|u| u.id == id && u.status == UploadStatus::Uploading)?;
        upload.status = UploadStatus::Failed { reason: reason.into() };
        Some(upload)
    }

    /// Drop a placeholder regardless of status.
    pub fn dismiss(&mut self, id: UploadId) -> bool {
        let before = self.uploads.len();
        self.uploads.retain(|u| u.id != id);
        self.uploads.len() != before
    }

    /// Look up a placeholder.
    pub fn get(&self, id: UploadId) -> Option<&PendingUpload> {
        self.uploads.iter().find(|u| u.id == id)
    }

    /// Placeholders shown in the view for `scope`.
    pub fn in_scope<'a>(&'a self, scope: &'a UploadScope) -> impl Iterator<Item = &'a PendingUpload> {
        self.uploads.iter().filter(move |u| &u.scope == scope)
    }

    /// Every placeholder.
    pub fn all(&self) -> &[PendingUpload] {
        &self.uploads
    }
}
