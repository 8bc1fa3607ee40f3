//! Status derivation over a fetched document snapshot.

use std::collections::HashMap;

use uuid::Uuid;

use haulmark_entity::document::{Document, DocumentStatus};

/// Status of `document_type` in `records`.
///
/// The first record of that type decides; no match, or a match without a
/// status, is [`DocumentStatus::NotUploaded`]. Snapshots are fetched newest
/// first, so the newest upload wins when duplicates slip through.
pub fn derive_status(records: &[Document], document_type: &str) -> DocumentStatus {
    records
        .iter()
        .find(|record| record.document_type == document_type)
        .map(Document::effective_status)
        .unwrap_or_default()
}

/// Documents of a snapshot keyed by `(parent_id, document_type)`.
///
/// Built once per fetch. The first record per key is kept, so lookups agree
/// with [`derive_status`] on the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    entries: HashMap<(Uuid, String), Document>,
}

impl DocumentIndex {
    /// Index a snapshot.
    pub fn build(records: &[Document]) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            entries
                .entry((record.parent_id, record.document_type.clone()))
                .or_insert_with(|| record.clone());
        }
        Self { entries }
    }

    /// The authoritative document for a slot.
    pub fn get(&self, parent_id: Uuid, document_type: &str) -> Option<&Document> {
        self.entries.get(&(parent_id, document_type.to_string()))
    }

    /// Status of a slot.
    pub fn status(&self, parent_id: Uuid, document_type: &str) -> DocumentStatus {
        self.get(parent_id, document_type)
            .map(Document::effective_status)
            .unwrap_or_default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use haulmark_core::types::DocumentId;
    use haulmark_entity::document::{
        DocumentKind, KycDocumentType, LoadDocumentType,
    };

    fn doc(parent: Uuid, kind: &str, status: Option<DocumentStatus>, minute: u32) -> Document {
        Document {
            id: DocumentId::new(),
            parent_id: parent,
            document_type: kind.to_string(),
            file_name: Some(format!("{kind}.pdf")),
            file_url: None,
            storage_key: None,
            status,
            rejection_reason: None,
            uploaded_by: None,
            uploaded_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap()),
        }
    }

    #[test]
    fn test_no_match_is_not_uploaded_for_every_type() {
        let parent = Uuid::new_v4();
        let unrelated = vec![doc(parent, "something_else", Some(DocumentStatus::Verified), 0)];
        for kind in KycDocumentType::all() {
            assert_eq!(derive_status(&[], kind.as_str()), DocumentStatus::NotUploaded);
            assert_eq!(derive_status(&unrelated, kind.as_str()), DocumentStatus::NotUploaded);
        }
        for kind in LoadDocumentType::all() {
            assert_eq!(derive_status(&unrelated, kind.as_str()), DocumentStatus::NotUploaded);
        }
    }

    #[test]
    fn test_null_status_is_not_uploaded() {
        let records = vec![doc(Uuid::new_v4(), "pan_card", None, 0)];
        assert_eq!(derive_status(&records, "pan_card"), DocumentStatus::NotUploaded);
    }

    #[test]
    fn test_first_match_wins_and_index_agrees() {
        let parent = Uuid::new_v4();
        let records = vec![
            doc(parent, "pan_card", Some(DocumentStatus::Pending), 30),
            doc(parent, "pan_card", Some(DocumentStatus::Rejected), 10),
            doc(parent, "aadhaar_card", Some(DocumentStatus::Verified), 5),
        ];
        let index = DocumentIndex::build(&records);

        assert_eq!(derive_status(&records, "pan_card"), DocumentStatus::Pending);
        assert_eq!(index.status(parent, "pan_card"), DocumentStatus::Pending);
        assert_eq!(index.status(parent, "aadhaar_card"), DocumentStatus::Verified);
        assert_eq!(index.status(Uuid::new_v4(), "pan_card"), DocumentStatus::NotUploaded);
        assert_eq!(index.len(), 2);
    }
}
