//! In-process blob store for tests and offline use.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::traits::BlobStore;

use crate::keys::validate_key;

/// A stored object.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
}

/// Blob store keeping objects in memory. Clones share contents.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    objects: Arc<DashMap<(String, String), StoredObject>>,
    public_base_url: String,
    uploads: Arc<AtomicU64>,
    fail_uploads: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    /// Create an empty store reporting URLs under `public_base_url`.
    pub fn new(public_base_url: &str) -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            uploads: Arc::new(AtomicU64::new(0)),
            fail_uploads: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of upload attempts made against this store.
    pub fn upload_count(&self) -> u64 {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Number of objects currently stored.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Keys stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Content type recorded for an object.
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .and_then(|object| object.content_type.clone())
    }

    /// Make every subsequent upload fail with a storage error.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("http://localhost/storage")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<()> {
        validate_key(bucket, key)?;
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!(
                "Upload of {bucket}/{key} rejected by storage"
            )));
        }
        self.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{bucket}/{key}", self.public_base_url)
    }

    async fn download(&self, bucket: &str, key: &str) -> AppResult<Bytes> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {bucket}/{key}")))
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> AppResult<()> {
        for key in keys {
            self.objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool> {
        Ok(self
            .objects
            .contains_key(&(bucket.to_string(), key.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulmark_core::error::ErrorKind;

    #[tokio::test]
    async fn test_clones_share_objects() {
        let store = MemoryBlobStore::default();
        let other = store.clone();
        store
            .upload("kyc-documents", "u1/pan_card/1.pdf", Bytes::from_static(b"x"), Some("application/pdf"))
            .await
            .unwrap();

        assert!(other.exists("kyc-documents", "u1/pan_card/1.pdf").await.unwrap());
        assert_eq!(other.keys("kyc-documents"), vec!["u1/pan_card/1.pdf".to_string()]);
        assert_eq!(
            other.content_type("kyc-documents", "u1/pan_card/1.pdf").as_deref(),
            Some("application/pdf")
        );
        assert_eq!(store.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_switch() {
        let store = MemoryBlobStore::default();
        store.fail_uploads(true);
        let err = store
            .upload("kyc-documents", "u1/pan_card/1.pdf", Bytes::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(store.upload_count(), 1);
        assert_eq!(store.object_count(), 0);
    }
}
