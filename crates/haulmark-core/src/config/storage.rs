//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Which blob storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    /// The hosted object storage API (shares `store.url`).
    Rest,
    /// Local filesystem.
    Local,
    /// In-process storage.
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default = "default_backend")]
    pub backend: BlobBackend,
    /// Root directory for the local backend.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Base URL under which local or in-memory blobs are reported as public.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum document upload size in bytes (default 10 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Accepted MIME types for document uploads.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Bucket for KYC documents.
    #[serde(default = "default_kyc_bucket")]
    pub kyc_bucket: String,
    /// Bucket for load documents.
    #[serde(default = "default_load_bucket")]
    pub load_bucket: String,
}

impl StorageConfig {
    /// Check whether a content type may be uploaded.
    ///
    /// An empty allow-list accepts everything.
    pub fn accepts(&self, content_type: &str) -> bool {
        self.allowed_content_types.is_empty()
            || self
                .allowed_content_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local_root: default_local_root(),
            public_base_url: default_public_base_url(),
            max_upload_size_bytes: default_max_upload(),
            allowed_content_types: default_allowed_content_types(),
            kyc_bucket: default_kyc_bucket(),
            load_bucket: default_load_bucket(),
        }
    }
}

fn default_backend() -> BlobBackend {
    BlobBackend::Memory
}

fn default_local_root() -> String {
    "./data/storage".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost/storage".to_string()
}

fn default_max_upload() -> u64 {
    10_485_760 // 10 MB
}

fn default_allowed_content_types() -> Vec<String> {
    vec![
        "application/pdf".to_string(),
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}

fn default_kyc_bucket() -> String {
    "kyc-documents".to_string()
}

fn default_load_bucket() -> String {
    "load-documents".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_is_case_insensitive() {
        let config = StorageConfig::default();
        assert!(config.accepts("application/pdf"));
        assert!(config.accepts("IMAGE/PNG"));
        assert!(!config.accepts("application/zip"));
    }

    #[test]
    fn test_empty_allow_list_accepts_all() {
        let config = StorageConfig {
            allowed_content_types: Vec::new(),
            ..StorageConfig::default()
        };
        assert!(config.accepts("application/zip"));
    }
}
