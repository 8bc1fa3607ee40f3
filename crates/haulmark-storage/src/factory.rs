//! Blob store construction from configuration.

use std::sync::Arc;

use tracing::info;

use haulmark_core::config::{BlobBackend, StorageConfig, StoreConfig};
use haulmark_core::result::AppResult;
use haulmark_core::traits::BlobStore;

use crate::providers::{LocalBlobStore, MemoryBlobStore, RestBlobStore};

/// Build the configured blob store for one caller.
///
/// The hosted backend shares the record store's project URL and keys.
pub async fn create_blob_store(
    storage: &StorageConfig,
    store: &StoreConfig,
    access_token: Option<String>,
) -> AppResult<Arc<dyn BlobStore>> {
    match storage.backend {
        BlobBackend::Rest => {
            info!(url = %store.url, "Using hosted object storage");
            Ok(Arc::new(RestBlobStore::new(store, access_token)?))
        }
        BlobBackend::Local => {
            info!(root = %storage.local_root, "Using local filesystem storage");
            Ok(Arc::new(
                LocalBlobStore::new(&storage.local_root, &storage.public_base_url).await?,
            ))
        }
        BlobBackend::Memory => {
            info!("Using in-memory blob storage");
            Ok(Arc::new(MemoryBlobStore::new(&storage.public_base_url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_backend_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("blobs");
        let storage = StorageConfig {
            backend: BlobBackend::Local,
            local_root: root.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        let blobs = create_blob_store(&storage, &StoreConfig::default(), None)
            .await
            .unwrap();
        assert_eq!(blobs.provider_type(), "local");
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_rest_backend_requires_url() {
        let storage = StorageConfig {
            backend: BlobBackend::Rest,
            ..StorageConfig::default()
        };
        let err = create_blob_store(&storage, &StoreConfig::default(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, haulmark_core::error::ErrorKind::Configuration);
    }
}
