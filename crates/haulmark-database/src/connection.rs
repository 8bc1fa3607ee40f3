//! Record store construction from configuration.

use std::sync::Arc;

use tracing::info;

use haulmark_core::config::{RecordBackend, StoreConfig};
use haulmark_core::result::AppResult;
use haulmark_core::traits::RecordStore;
use haulmark_core::types::UserId;

use crate::memory::MemoryRecordStore;
use crate::rest::RestRecordStore;

/// Build the configured record store for one caller.
///
/// `access_token` authenticates the caller against the hosted API;
/// `principal` is the identity the in-memory backend enforces its rules for.
pub fn connect(
    config: &StoreConfig,
    access_token: Option<String>,
    principal: Option<UserId>,
) -> AppResult<Arc<dyn RecordStore>> {
    match config.backend {
        RecordBackend::Rest => {
            info!(
                url = %config.url,
                anon_key = %mask_key(&config.anon_key),
                authenticated = access_token.is_some(),
                "Connecting to hosted record store"
            );
            Ok(Arc::new(RestRecordStore::new(config, access_token)?))
        }
        RecordBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(
                MemoryRecordStore::with_marketplace_policy().as_principal(principal),
            ))
        }
    }
}

/// Mask all but the last four characters of a key for safe logging.
fn mask_key(key: &str) -> String {
    let visible = key.chars().count().min(4);
    let hidden = key.chars().count() - visible;
    let tail: String = key.chars().skip(hidden).collect();
    format!("{}{tail}", "*".repeat(hidden.min(8)))
}
