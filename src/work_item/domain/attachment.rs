//! Attachment metadata.
//!
//! Bytes live behind the attachment store port; this module only describes
//! them.

use super::{AttachmentId, WorkItemDomainError, WorkItemRef};
use crate::actor::domain::ActorId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum file-name length in characters.
const MAX_FILE_NAME_CHARS: usize = 255;

/// Display name of an uploaded file.
///
/// The name is shown to users only and never used as a storage path, but it
/// is still restricted to a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttachmentFileName(String);

impl AttachmentFileName {
    /// Validates a file name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::InvalidFileName`] for empty names, names
    /// containing path separators or control characters, relative path
    /// components, or names longer than 255 characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, WorkItemDomainError> {
        let value = raw.into();
        let trimmed = value.trim();
        let has_forbidden_char = trimmed
            .chars()
            .any(|ch| ch == '/' || ch == '\\' || ch.is_control());
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || has_forbidden_char
            || trimmed.chars().count() > MAX_FILE_NAME_CHARS
        {
            return Err(WorkItemDomainError::InvalidFileName(value));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AttachmentFileName {
    type Error = WorkItemDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttachmentFileName> for String {
    fn from(value: AttachmentFileName) -> Self {
        value.0
    }
}

/// Metadata for a blob that has just been written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    /// Work item the file belongs to.
    pub target: WorkItemRef,
    /// Display name.
    pub file_name: AttachmentFileName,
    /// MIME type supplied by the uploader.
    pub content_type: String,
    /// Blob size.
    pub size_bytes: u64,
    /// Lowercase hex SHA-256 of the blob.
    pub checksum: String,
    /// Key under which the blob was stored.
    pub storage_key: String,
    /// Uploader.
    pub uploaded_by: ActorId,
}

/// Attachment metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    id: AttachmentId,
    target: WorkItemRef,
    file_name: AttachmentFileName,
    content_type: String,
    size_bytes: u64,
    checksum: String,
    storage_key: String,
    uploaded_by: ActorId,
    uploaded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing persisted attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAttachmentData {
    /// Persisted attachment identifier.
    pub id: AttachmentId,
    /// Work item the file belongs to.
    pub target: WorkItemRef,
    /// Persisted display name.
    pub file_name: AttachmentFileName,
    /// Persisted MIME type.
    pub content_type: String,
    /// Persisted size.
    pub size_bytes: u64,
    /// Persisted checksum.
    pub checksum: String,
    /// Persisted storage key.
    pub storage_key: String,
    /// Persisted uploader.
    pub uploaded_by: ActorId,
    /// Persisted upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl Attachment {
    /// Creates attachment metadata stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`WorkItemDomainError::EmptyContentType`] when the content type
    /// is blank.
    pub fn new(draft: NewAttachment, clock: &impl Clock) -> Result<Self, WorkItemDomainError> {
        let content_type = draft.content_type.trim();
        if content_type.is_empty() {
            return Err(WorkItemDomainError::EmptyContentType);
        }
        Ok(Self {
            id: AttachmentId::new(),
            target: draft.target,
            file_name: draft.file_name,
            content_type: content_type.to_ascii_lowercase(),
            size_bytes: draft.size_bytes,
            checksum: draft.checksum,
            storage_key: draft.storage_key,
            uploaded_by: draft.uploaded_by,
            uploaded_at: clock.utc(),
        })
    }

    /// Reconstructs attachment metadata from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAttachmentData) -> Self {
        Self {
            id: data.id,
            target: data.target,
            file_name: data.file_name,
            content_type: data.content_type,
            size_bytes: data.size_bytes,
            checksum: data.checksum,
            storage_key: data.storage_key,
            uploaded_by: data.uploaded_by,
            uploaded_at: data.uploaded_at,
        }
    }

    /// Returns the attachment identifier.
    #[must_use]
    pub const fn id(&self) -> AttachmentId {
        self.id
    }

    /// Returns the work item the file belongs to.
    #[must_use]
    pub const fn target(&self) -> WorkItemRef {
        self.target
    }

    /// Returns the display name.
    #[must_use]
    pub const fn file_name(&self) -> &AttachmentFileName {
        &self.file_name
    }

    /// Returns the MIME type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the blob size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Returns the lowercase hex SHA-256 checksum.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Returns the blob's storage key.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Returns the uploader.
    #[must_use]
    pub const fn uploaded_by(&self) -> ActorId {
        self.uploaded_by
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }
}
