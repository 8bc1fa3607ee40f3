//! Document review status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a document slot.
///
/// The client only ever writes [`DocumentStatus::Pending`]; `Verified` and
/// `Rejected` are set by a reviewer on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// No document has been uploaded for the slot.
    #[default]
    NotUploaded,
    /// Uploaded and waiting for review.
    Pending,
    /// Accepted by a reviewer.
    Verified,
    /// Refused by a reviewer; a new upload is expected.
    Rejected,
}

impl DocumentStatus {
    /// Whether the user should (re-)upload this slot.
    pub fn needs_upload(&self) -> bool {
        matches!(self, Self::NotUploaded | Self::Rejected)
    }

    /// Parse a wire value, returning `None` for values this client does not know.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "not_uploaded" => Some(Self::NotUploaded),
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotUploaded => "not_uploaded",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::NotUploaded).unwrap(),
            "\"not_uploaded\""
        );
        let status: DocumentStatus = serde_json::from_str("\"verified\"").unwrap();
        assert_eq!(status, DocumentStatus::Verified);
    }

    #[test]
    fn test_from_wire() {
        assert_eq!(
            DocumentStatus::from_wire("rejected"),
            Some(DocumentStatus::Rejected)
        );
        assert_eq!(DocumentStatus::from_wire("under_review"), None);
    }

    #[test]
    fn test_needs_upload() {
        assert!(DocumentStatus::NotUploaded.needs_upload());
        assert!(DocumentStatus::Rejected.needs_upload());
        assert!(!DocumentStatus::Pending.needs_upload());
    }
}
