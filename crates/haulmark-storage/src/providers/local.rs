//! Local filesystem blob store.
//!
//! Objects live at `{root}/{bucket}/{key}`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use haulmark_core::error::{AppError, ErrorKind};
use haulmark_core::result::AppResult;
use haulmark_core::traits::BlobStore;

use crate::keys::validate_key;

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all buckets.
    root: PathBuf,
    /// Base URL reported for stored objects.
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve an object to its path on disk.
    fn resolve(&self, bucket: &str, key: &str) -> AppResult<PathBuf> {
        validate_key(bucket, key)?;
        Ok(self.root.join(bucket).join(key))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> AppResult<()> {
        let full_path = self.resolve(bucket, key)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {bucket}/{key}"),
                e,
            )
        })?;

        debug!(bucket, key, bytes = data.len(), "Wrote object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{bucket}/{key}", self.public_base_url)
    }

    async fn download(&self, bucket: &str, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(bucket, key)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {bucket}/{key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read object: {bucket}/{key}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> AppResult<()> {
        for key in keys {
            let full_path = self.resolve(bucket, key)?;
            match fs::remove_file(&full_path).await {
                Ok(()) => debug!(bucket, key = %key, "Removed object"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to remove object: {bucket}/{key}"),
                        e,
                    ));
                }
            }
        }
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        let full_path = self.resolve(bucket, key)?;
        Ok(fs::try_exists(&full_path).await.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_download_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap(), "http://files.local/")
            .await
            .unwrap();

        let key = "u1/pan_card/1700000000000.pdf";
        store
            .upload("kyc-documents", key, Bytes::from_static(b"%PDF"), None)
            .await
            .unwrap();
        assert!(store.exists("kyc-documents", key).await.unwrap());
        assert!(dir.path().join("kyc-documents").join(key).is_file());

        let data = store.download("kyc-documents", key).await.unwrap();
        assert_eq!(&data[..], b"%PDF");

        store
            .remove("kyc-documents", &[key.to_string(), "u1/missing.pdf".to_string()])
            .await
            .unwrap();
        assert!(!store.exists("kyc-documents", key).await.unwrap());
    }

    #[tokio::test]
    async fn test_public_url_and_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap(), "http://files.local/")
            .await
            .unwrap();

        assert_eq!(
            store.public_url("load-documents", "l1/invoice/1.pdf"),
            "http://files.local/load-documents/l1/invoice/1.pdf"
        );
        let err = store.download("load-documents", "l1/nope.pdf").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().to_str().unwrap(), "http://files.local")
            .await
            .unwrap();

        let err = store
            .upload("kyc-documents", "../../escape.txt", Bytes::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
