use std::future::Future;

use common::storage::{FilePayload, UploadCategory, UploadRef, UploadStore};
use futures::future::join_all;

use crate::error::AppError;

/// Tracks the attachments written during one mutation call so that a later
/// failure can discard exactly those, and nothing else.
///
/// A row in the database must never point at a missing file. The batch
/// enforces the safe ordering: uploads happen first, the database write goes
/// through [`UploadBatch::commit_with`] (which compensates on failure), and
/// superseded files can only be released through the [`Committed`] handle
/// that a successful write returns.
pub struct UploadBatch<'a> {
    store: &'a dyn UploadStore,
    written: Vec<UploadRef>,
}

impl<'a> UploadBatch<'a> {
    pub fn new(store: &'a dyn UploadStore) -> Self {
        Self {
            store,
            written: Vec::new(),
        }
    }

    /// Upload one attachment and track it for compensation. `label` names
    /// the attachment slot in error messages.
    ///
    /// If the store rejects the payload, everything staged earlier in this
    /// call is discarded before the error is returned.
    pub async fn stage(
        &mut self,
        file: &FilePayload,
        category: UploadCategory,
        label: &str,
    ) -> Result<UploadRef, AppError> {
        match self.store.store(file, category).await {
            Ok(reference) => {
                self.written.push(reference.clone());
                Ok(reference)
            }
            Err(err) => {
                let written = std::mem::take(&mut self.written);
                discard_all(self.store, written).await;
                Err(AppError::Upload(format!("Failed to upload {label}: {err}")))
            }
        }
    }

    /// Discard everything staged in this call.
    pub async fn abort(self) {
        discard_all(self.store, self.written).await;
    }

    /// Run the database write. On error the staged uploads are discarded and
    /// the error is returned unchanged; on success the caller receives the
    /// written value and a handle for releasing superseded attachments.
    pub async fn commit_with<T, F>(self, write: F) -> Result<(T, Committed<'a>), AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match write.await {
            Ok(value) => Ok((value, Committed { store: self.store })),
            Err(err) => {
                discard_all(self.store, self.written).await;
                Err(err)
            }
        }
    }
}

/// Proof that the database write committed. Superseded attachments can only
/// be released through this handle, so an old file is never deleted while
/// the database still references it.
pub struct Committed<'a> {
    store: &'a dyn UploadStore,
}

impl Committed<'_> {
    /// Best-effort discard of attachments replaced by this mutation.
    pub async fn release<I>(self, old: I)
    where
        I: IntoIterator<Item = UploadRef>,
    {
        discard_all(self.store, old.into_iter().collect()).await;
    }
}

/// Discard a set of references concurrently. Individual failures are logged
/// and swallowed: cleanup must not mask the outcome that led here.
pub async fn discard_all(store: &dyn UploadStore, refs: Vec<UploadRef>) {
    let results = join_all(refs.iter().map(|r| store.discard(r))).await;
    for (reference, outcome) in refs.iter().zip(results) {
        match outcome {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Upload {reference} was already gone"),
            Err(err) => tracing::warn!("Failed to discard upload {reference}: {err}"),
        }
    }
}

/// Parse a reference column value, logging anything unparseable instead of
/// failing the surrounding operation.
pub fn stored_ref(value: &str) -> Option<UploadRef> {
    match UploadRef::parse(value) {
        Ok(reference) => Some(reference),
        Err(err) => {
            tracing::warn!("Ignoring malformed upload reference '{value}': {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use common::storage::filesystem::FilesystemUploadStore;

    use super::*;

    fn png(bytes: &[u8]) -> FilePayload {
        FilePayload {
            file_name: "image.png".into(),
            content_type: "image/png".into(),
            bytes: bytes.to_vec(),
        }
    }

    async fn temp_store() -> (FilesystemUploadStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemUploadStore::new(dir.path().join("uploads"), 1024)
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn successful_write_keeps_staged_files() {
        let (store, _dir) = temp_store().await;
        let mut batch = UploadBatch::new(&store);
        let reference = batch
            .stage(&png(b"cover"), UploadCategory::Blog, "cover image")
            .await
            .unwrap();

        let (value, _committed) = batch
            .commit_with(async { Ok::<_, AppError>(42) })
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert!(store.exists(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn failed_write_discards_every_staged_file() {
        let (store, _dir) = temp_store().await;
        let mut batch = UploadBatch::new(&store);
        let a = batch
            .stage(&png(b"one"), UploadCategory::Products, "thumbnail")
            .await
            .unwrap();
        let b = batch
            .stage(&png(b"two"), UploadCategory::Products, "detail image")
            .await
            .unwrap();

        let result = batch
            .commit_with(async {
                Err::<(), _>(AppError::Conflict("slug already exists".into()))
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(!store.exists(&a).await.unwrap());
        assert!(!store.exists(&b).await.unwrap());
    }

    #[tokio::test]
    async fn failed_stage_compensates_earlier_uploads() {
        let (store, _dir) = temp_store().await;
        let mut batch = UploadBatch::new(&store);
        let first = batch
            .stage(&png(b"small"), UploadCategory::Products, "thumbnail")
            .await
            .unwrap();

        let oversized = png(&[0u8; 2048]);
        let err = batch
            .stage(&oversized, UploadCategory::Products, "detail image")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upload(msg) if msg.contains("detail image")));
        assert!(!store.exists(&first).await.unwrap());
    }

    #[tokio::test]
    async fn abort_discards_staged_files() {
        let (store, _dir) = temp_store().await;
        let mut batch = UploadBatch::new(&store);
        let reference = batch
            .stage(&png(b"logo"), UploadCategory::Clients, "logo")
            .await
            .unwrap();

        batch.abort().await;
        assert!(!store.exists(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn old_file_survives_a_failed_replacement() {
        let (store, _dir) = temp_store().await;

        // The attachment an earlier mutation left behind.
        let old = store
            .store(&png(b"old logo"), UploadCategory::Clients)
            .await
            .unwrap();

        let mut batch = UploadBatch::new(&store);
        let replacement = batch
            .stage(&png(b"new logo"), UploadCategory::Clients, "logo")
            .await
            .unwrap();

        let result = batch
            .commit_with(async {
                Err::<(), _>(AppError::NotFound("Record no longer exists".into()))
            })
            .await;

        assert!(result.is_err());
        assert!(store.exists(&old).await.unwrap());
        assert!(!store.exists(&replacement).await.unwrap());
    }

    #[tokio::test]
    async fn old_file_released_only_after_commit() {
        let (store, _dir) = temp_store().await;

        let old = store
            .store(&png(b"old logo"), UploadCategory::Clients)
            .await
            .unwrap();

        let mut batch = UploadBatch::new(&store);
        let replacement = batch
            .stage(&png(b"new logo"), UploadCategory::Clients, "logo")
            .await
            .unwrap();

        let (_, committed) = batch
            .commit_with(async { Ok::<_, AppError>(()) })
            .await
            .unwrap();
        committed.release(vec![old.clone()]).await;

        assert!(!store.exists(&old).await.unwrap());
        assert!(store.exists(&replacement).await.unwrap());
    }

    #[tokio::test]
    async fn discard_all_swallows_missing_files() {
        let (store, _dir) = temp_store().await;
        let reference = store
            .store(&png(b"gone soon"), UploadCategory::Team)
            .await
            .unwrap();
        store.discard(&reference).await.unwrap();

        // Discarding again must not fail the caller.
        discard_all(&store, vec![reference]).await;
    }

    #[test]
    fn stored_ref_rejects_garbage() {
        assert!(stored_ref("/uploads/products/ok.png").is_some());
        assert!(stored_ref("https://elsewhere.example/x.png").is_none());
        assert!(stored_ref("/uploads/nope/x.png").is_none());
    }
}
