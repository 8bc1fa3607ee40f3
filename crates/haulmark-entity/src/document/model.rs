//! Document metadata record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;

use haulmark_core::types::{DocumentId, UserId};

use super::status::DocumentStatus;

/// Category-neutral name of the parent column. Each category stores it under
/// its own column name (`user_id`, `load_id`); the tracker renames on the way
/// in and out.
pub const PARENT_ID_FIELD: &str = "parent_id";

/// Metadata row pointing at an uploaded blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Server-assigned identifier.
    pub id: DocumentId,
    /// The user (KYC) or load (paperwork) the document belongs to.
    pub parent_id: Uuid,
    /// Wire name of the document type. Kept as a string so rows with types
    /// this client does not know still decode.
    pub document_type: String,
    /// Original file name.
    pub file_name: Option<String>,
    /// Public URL of the blob.
    pub file_url: Option<String>,
    /// Key of the blob within its bucket.
    pub storage_key: Option<String>,
    /// Review status; `null` is treated as not uploaded. Unknown values
    /// decode as `None` so one odd row cannot fail a whole fetch.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<DocumentStatus>,
    /// Reviewer's note when rejected.
    pub rejection_reason: Option<String>,
    /// Who uploaded the file.
    pub uploaded_by: Option<UserId>,
    /// When the file was uploaded.
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Status with the `null` default applied.
    pub fn effective_status(&self) -> DocumentStatus {
        self.status.unwrap_or(DocumentStatus::NotUploaded)
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<DocumentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let status = DocumentStatus::from_wire(&value);
        if status.is_none() {
            warn!(status = %value, "Unknown document status, treating as not uploaded");
        }
        status
    }))
}

/// Fields written when registering an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpsert {
    /// Wire name of the document type.
    pub document_type: String,
    /// Original file name.
    pub file_name: String,
    /// Public URL of the blob.
    pub file_url: String,
    /// Key of the blob within its bucket.
    pub storage_key: String,
    /// Always [`DocumentStatus::Pending`] when written by the client.
    pub status: DocumentStatus,
    /// Who uploaded the file.
    pub uploaded_by: UserId,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_status_is_not_uploaded() {
        let doc: Document = serde_json::from_value(json!({
            "id": DocumentId::new(),
            "parent_id": Uuid::new_v4(),
            "document_type": "pan_card",
            "status": null,
        }))
        .unwrap();
        assert_eq!(doc.effective_status(), DocumentStatus::NotUploaded);
    }

    #[test]
    fn test_unknown_status_decodes_as_not_uploaded() {
        let rows = json!([
            {
                "id": DocumentId::new(),
                "parent_id": Uuid::nil(),
                "document_type": "invoice",
                "status": "verified",
            },
            {
                "id": DocumentId::new(),
                "parent_id": Uuid::nil(),
                "document_type": "eway_bill",
                "status": "under_review",
            },
            {
                "id": DocumentId::new(),
                "parent_id": Uuid::nil(),
                "document_type": "weight_slip",
            },
        ]);
        let docs: Vec<Document> = serde_json::from_value(rows).unwrap();
        assert_eq!(docs[0].effective_status(), DocumentStatus::Verified);
        assert_eq!(docs[1].status, None);
        assert_eq!(docs[2].effective_status(), DocumentStatus::NotUploaded);
    }
}
