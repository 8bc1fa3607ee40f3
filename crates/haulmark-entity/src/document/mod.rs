//! Uploaded documents and their review status.

pub mod category;
pub mod model;
pub mod status;

pub use category::{
    DocumentCategory, DocumentKind, Kyc, KycDocumentType, LoadDocumentType, LoadPaperwork,
};
pub use model::{Document, DocumentUpsert, PARENT_ID_FIELD};
pub use status::DocumentStatus;
