//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty file (or
//! no file at all) still yields a usable offline configuration.

pub mod logging;
pub mod storage;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::storage::{BlobBackend, StorageConfig};
pub use self::store::{RecordBackend, StoreConfig};

use crate::error::AppError;
use crate::result::AppResult;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "HAULMARK";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote record store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config/default.toml`, `config/{env}.toml`,
    /// and `HAULMARK__*` environment variables.
    pub fn load(env: &str) -> AppResult<Self> {
        Self::load_from("config", env)
    }

    /// Load configuration from the given directory.
    ///
    /// Missing files are skipped; environment variables always win.
    pub fn load_from(dir: &str, env: &str) -> AppResult<Self> {
        let dir = dir.trim_end_matches('/');
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Check cross-field requirements that serde defaults cannot express.
    pub fn validate(&self) -> AppResult<()> {
        if self.store.backend == RecordBackend::Rest && self.store.url.is_empty() {
            return Err(AppError::configuration(
                "store.url is required when store.backend = \"rest\"",
            ));
        }
        if self.storage.backend == BlobBackend::Rest && self.store.url.is_empty() {
            return Err(AppError::configuration(
                "store.url is required when storage.backend = \"rest\"",
            ));
        }
        if self.storage.max_upload_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_upload_size_bytes must be greater than zero",
            ));
        }
        Ok(())
    }
}
