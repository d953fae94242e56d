use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::category::UploadCategory;
use super::error::StorageError;
use super::reference::UploadRef;
use super::traits::{ALLOWED_IMAGE_TYPES, FilePayload, UploadStore};

/// Filesystem-backed upload store.
///
/// Files live under `{root}/{category}/{uuid}.{ext}` and their public
/// references mirror that layout under `/uploads/`. Writes go through a
/// temp file followed by a rename so a half-written upload is never visible
/// under its final name.
pub struct FilesystemUploadStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        let root = fs::canonicalize(&root).await?;
        Ok(Self { root, max_size })
    }

    /// Resolve a reference to its on-disk path, refusing anything that would
    /// escape the storage root.
    fn resolve(&self, reference: &UploadRef) -> Result<PathBuf, StorageError> {
        let rel = Path::new(reference.category().as_str()).join(reference.file_name());
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidReference(format!(
                "unsafe path in '{reference}'"
            )));
        }
        let path = self.root.join(rel);
        if !path.starts_with(&self.root) {
            return Err(StorageError::InvalidReference(format!(
                "'{reference}' escapes the storage root"
            )));
        }
        Ok(path)
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(Uuid::new_v4().to_string())
    }
}

/// Pick a safe extension: the client's if it is plain ASCII alphanumeric,
/// otherwise one derived from the declared content type.
fn file_extension(file_name: &str, content_type: &str) -> &'static str {
    if let Some((_, ext)) = file_name.rsplit_once('.') {
        let known = match ext.to_ascii_lowercase().as_str() {
            "png" => Some("png"),
            "jpg" | "jpeg" => Some("jpg"),
            "gif" => Some("gif"),
            "webp" => Some("webp"),
            _ => None,
        };
        if let Some(known) = known {
            return known;
        }
    }
    match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn store(
        &self,
        file: &FilePayload,
        category: UploadCategory,
    ) -> Result<UploadRef, StorageError> {
        if file.size() > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: file.size(),
                limit: self.max_size,
            });
        }
        if !ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
            return Err(StorageError::UnsupportedMediaType(
                file.content_type.clone(),
            ));
        }

        let name = format!(
            "{}.{}",
            Uuid::new_v4(),
            file_extension(&file.file_name, &file.content_type)
        );
        let reference = UploadRef::new(category, name);
        let dest = self.resolve(&reference)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, &file.bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp, &dest).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(reference)
    }

    async fn discard(&self, reference: &UploadRef) -> Result<bool, StorageError> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, reference: &UploadRef) -> Result<bool, StorageError> {
        let path = self.resolve(reference)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::traits::DEFAULT_MAX_UPLOAD_SIZE;
    use super::*;

    fn png(bytes: &[u8]) -> FilePayload {
        FilePayload {
            file_name: "photo.png".into(),
            content_type: "image/png".into(),
            bytes: bytes.to_vec(),
        }
    }

    async fn temp_store() -> (FilesystemUploadStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store =
            FilesystemUploadStore::new(dir.path().join("uploads"), DEFAULT_MAX_UPLOAD_SIZE)
                .await
                .unwrap();
        (store, dir)
    }

    /// Number of regular files under the store root, .tmp included.
    fn files_on_disk(dir: &tempfile::TempDir) -> usize {
        fn walk(path: &std::path::Path, count: &mut usize) {
            for entry in std::fs::read_dir(path).unwrap() {
                let entry = entry.unwrap();
                if entry.file_type().unwrap().is_dir() {
                    walk(&entry.path(), count);
                } else {
                    *count += 1;
                }
            }
        }
        let mut count = 0;
        walk(dir.path(), &mut count);
        count
    }

    #[tokio::test]
    async fn store_writes_under_category_namespace() {
        let (store, _dir) = temp_store().await;
        let reference = store
            .store(&png(b"fake image data"), UploadCategory::Products)
            .await
            .unwrap();

        assert!(reference.as_url().starts_with("/uploads/products/"));
        assert!(reference.file_name().ends_with(".png"));
        assert!(store.exists(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn store_generates_distinct_names_for_identical_payloads() {
        let (store, _dir) = temp_store().await;
        let a = store.store(&png(b"same"), UploadCategory::Blog).await.unwrap();
        let b = store.store(&png(b"same"), UploadCategory::Blog).await.unwrap();
        assert_ne!(a, b);
        assert!(store.exists(&a).await.unwrap());
        assert!(store.exists(&b).await.unwrap());
    }

    #[tokio::test]
    async fn oversized_payload_rejected_with_zero_bytes_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemUploadStore::new(dir.path().join("uploads"), 16)
            .await
            .unwrap();

        let result = store
            .store(&png(b"way more than sixteen bytes"), UploadCategory::Blog)
            .await;
        assert!(matches!(result, Err(StorageError::SizeLimitExceeded { .. })));
        assert_eq!(files_on_disk(&dir), 0);
    }

    #[tokio::test]
    async fn unsupported_content_type_rejected_with_zero_bytes_written() {
        let (store, dir) = temp_store().await;
        let file = FilePayload {
            file_name: "payload.svg".into(),
            content_type: "image/svg+xml".into(),
            bytes: b"<svg/>".to_vec(),
        };

        let result = store.store(&file, UploadCategory::Services).await;
        assert!(matches!(result, Err(StorageError::UnsupportedMediaType(_))));
        assert_eq!(files_on_disk(&dir), 0);
    }

    #[tokio::test]
    async fn discard_removes_the_file() {
        let (store, _dir) = temp_store().await;
        let reference = store
            .store(&png(b"to delete"), UploadCategory::Clients)
            .await
            .unwrap();

        assert!(store.discard(&reference).await.unwrap());
        assert!(!store.exists(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn discard_is_idempotent_on_missing_files() {
        let (store, _dir) = temp_store().await;
        let reference = store
            .store(&png(b"short lived"), UploadCategory::Clients)
            .await
            .unwrap();

        assert!(store.discard(&reference).await.unwrap());
        assert!(!store.discard(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn extension_falls_back_to_content_type() {
        let (store, _dir) = temp_store().await;
        let file = FilePayload {
            file_name: "no-extension".into(),
            content_type: "image/webp".into(),
            bytes: b"webp bytes".to_vec(),
        };
        let reference = store.store(&file, UploadCategory::Team).await.unwrap();
        assert!(reference.file_name().ends_with(".webp"));
    }

    #[tokio::test]
    async fn suspicious_client_extension_is_not_reused() {
        let (store, _dir) = temp_store().await;
        let file = FilePayload {
            file_name: "logo.png.exe".into(),
            content_type: "image/png".into(),
            bytes: b"bytes".to_vec(),
        };
        let reference = store.store(&file, UploadCategory::Clients).await.unwrap();
        assert!(reference.file_name().ends_with(".png"));
    }

    #[tokio::test]
    async fn constructor_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deep/nested/uploads");
        assert!(!base.exists());

        let _store = FilesystemUploadStore::new(base.clone(), 1024).await.unwrap();

        assert!(base.exists());
        assert!(base.join(".tmp").exists());
    }
}
