//! Remote record store configuration.

use serde::{Deserialize, Serialize};

/// Which record store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordBackend {
    /// The hosted REST API.
    Rest,
    /// An in-process store (tests and offline use).
    Memory,
}

/// Connection settings for the hosted record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default = "default_backend")]
    pub backend: RecordBackend,
    /// Project base URL, e.g. `https://xyz.example.co`.
    #[serde(default)]
    pub url: String,
    /// Public (anonymous) API key sent as the `apikey` header.
    #[serde(default)]
    pub anon_key: String,
    /// Database schema exposed by the REST API.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: String::new(),
            anon_key: String::new(),
            schema: default_schema(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_backend() -> RecordBackend {
    RecordBackend::Memory
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_timeout() -> u64 {
    30
}
