//! Blob storage trait for uploaded documents.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Bucketed binary object storage with publicly resolvable URLs.
///
/// Access control beyond the bucket's own policy is not applied here.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "rest").
    fn provider_type(&self) -> &str;

    /// Store `data` under `key` in `bucket`.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<()>;

    /// The URL at which the object can be fetched. Does not check existence.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Read an object back.
    async fn download(&self, bucket: &str, key: &str) -> AppResult<Bytes>;

    /// Remove objects. Missing keys are ignored.
    async fn remove(&self, bucket: &str, keys: &[String]) -> AppResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, bucket: &str, key: &str) -> AppResult<bool>;
}
