use async_trait::async_trait;

use super::category::UploadCategory;
use super::error::StorageError;
use super::reference::UploadRef;

/// Content types accepted for upload. Raster images only.
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Default size ceiling for a single upload (10 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// A submitted binary attachment with its declared metadata.
#[derive(Clone, Debug)]
pub struct FilePayload {
    /// Client-declared file name. Only its extension is ever reused.
    pub file_name: String,
    /// Client-declared MIME type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Durable storage for uploaded attachments, namespaced by category.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist a payload under the category namespace and return its public
    /// reference.
    ///
    /// Size and content-type limits are enforced before any bytes are
    /// written; a rejected payload leaves no trace on disk.
    async fn store(
        &self,
        file: &FilePayload,
        category: UploadCategory,
    ) -> Result<UploadRef, StorageError>;

    /// Delete a stored file.
    ///
    /// Idempotent: returns `Ok(false)` if the file did not exist.
    async fn discard(&self, reference: &UploadRef) -> Result<bool, StorageError>;

    /// Check whether a reference resolves to a stored file.
    async fn exists(&self, reference: &UploadRef) -> Result<bool, StorageError>;
}
