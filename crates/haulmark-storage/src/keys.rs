//! Storage key generation for uploaded documents.
//!
//! Key format: `{parent_id}/{document_type}/{unix_millis}.{ext}`. The parent
//! scopes the key to its owner or load; the millisecond timestamp makes
//! successive uploads of the same type distinct.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;

/// Extension used when the file name has none.
const DEFAULT_EXTENSION: &str = "bin";

/// Generate the storage key for a document upload.
pub fn document_key(
    parent_id: &Uuid,
    document_type: &str,
    file_name: &str,
    uploaded_at: DateTime<Utc>,
) -> String {
    format!(
        "{parent_id}/{document_type}/{}.{}",
        uploaded_at.timestamp_millis(),
        extension_of(file_name)
    )
}

/// Lowercase extension of a file name, restricted to ASCII alphanumerics.
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Guess a MIME type from a file name.
pub fn mime_from_name(file_name: &str) -> Option<&'static str> {
    let mime = match extension_of(file_name).as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}

/// Reject bucket names and keys that could escape their namespace.
pub fn validate_key(bucket: &str, key: &str) -> AppResult<()> {
    if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.starts_with('.') {
        return Err(AppError::validation(format!("Invalid bucket name: '{bucket}'")));
    }
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(AppError::validation(format!("Invalid storage key: '{key}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_key_contains_parent_and_timestamp() {
        let parent = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let key = document_key(&parent, "pan_card", "PAN Scan.JPG", at);
        assert_eq!(key, format!("{parent}/pan_card/{}.jpg", at.timestamp_millis()));
        assert!(validate_key("kyc-documents", &key).is_ok());
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(extension_of("scan"), "bin");
        assert_eq!(extension_of("archive."), "bin");
        assert_eq!(extension_of("weird.p/df"), "bin");
        assert_eq!(extension_of("invoice.PDF"), "pdf");
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_from_name("lr.pdf"), Some("application/pdf"));
        assert_eq!(mime_from_name("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_from_name("model.dwg"), None);
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("kyc-documents", "../etc/passwd").is_err());
        assert!(validate_key("kyc-documents", "/abs/key").is_err());
        assert!(validate_key("kyc-documents", "a//b").is_err());
        assert!(validate_key("../x", "a/b").is_err());
        assert!(validate_key("kyc-documents", "a/b.pdf").is_ok());
    }
}
