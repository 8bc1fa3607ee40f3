//! Document upload and review scenarios.

use bytes::Bytes;
use chrono::Utc;
use serde_json::json;

use haulmark_core::traits::{RecordStore, Severity};
use haulmark_core::types::Row;
use haulmark_entity::document::{DocumentStatus, KycDocumentType, LoadDocumentType};
use haulmark_entity::user::UserRole;
use haulmark_service::UploadRequest;

use crate::helpers::{TestMarketplace, load_draft};

fn pdf<K>(parent_id: uuid::Uuid, kind: K) -> UploadRequest<K> {
    UploadRequest {
        parent_id,
        document_type: kind,
        file_name: "scan.pdf".to_string(),
        content_type: None,
        data: Bytes::from_static(b"%PDF-1.7 test"),
    }
}

#[tokio::test]
async fn test_pan_card_upload_is_pending() {
    let market = TestMarketplace::new();
    let user = market.user(UserRole::FleetOwner);
    let before = Utc::now().timestamp_millis();

    let document = user
        .kyc
        .upload(&user.ctx, pdf(user.id.into_uuid(), KycDocumentType::PanCard))
        .await
        .unwrap();

    assert_eq!(document.effective_status(), DocumentStatus::Pending);
    assert_eq!(
        user.kyc.status(user.id.into_uuid(), KycDocumentType::PanCard),
        DocumentStatus::Pending
    );
    assert_eq!(
        user.kyc.status(user.id.into_uuid(), KycDocumentType::AadhaarCard),
        DocumentStatus::NotUploaded
    );

    let keys = market.blobs.keys("kyc-documents");
    assert_eq!(keys.len(), 1);
    let prefix = format!("{}/pan_card/", user.id);
    assert!(keys[0].starts_with(&prefix));
    let millis: i64 = keys[0][prefix.len()..]
        .trim_end_matches(".pdf")
        .parse()
        .unwrap();
    assert!(millis >= before);
    assert_eq!(user.notifier.count(Severity::Success), 1);
}

#[tokio::test]
async fn test_anonymous_upload_touches_nothing() {
    let market = TestMarketplace::new();
    let anon = market.anonymous();

    let err = anon
        .kyc
        .upload(&anon.ctx, pdf(anon.id.into_uuid(), KycDocumentType::PanCard))
        .await
        .unwrap_err();

    assert!(err.is_unauthenticated());
    assert_eq!(market.blobs.upload_count(), 0);
    assert_eq!(market.store.call_count(), 0);
}

#[tokio::test]
async fn test_review_outcome_appears_after_fetch() {
    let market = TestMarketplace::new();
    let user = market.user(UserRole::Driver);
    let parent = user.id.into_uuid();

    let pan = user
        .kyc
        .upload(&user.ctx, pdf(parent, KycDocumentType::PanCard))
        .await
        .unwrap();
    let aadhaar = user
        .kyc
        .upload(&user.ctx, pdf(parent, KycDocumentType::AadhaarCard))
        .await
        .unwrap();
    assert!(!user.kyc.is_complete(parent));

    let reviewer = market.store.as_principal(Some(user.id));
    let mut verified = Row::new();
    verified.insert("status".into(), json!("verified"));
    reviewer
        .update("kyc_documents", &pan.id.to_string(), verified.clone())
        .await
        .unwrap();
    reviewer
        .update("kyc_documents", &aadhaar.id.to_string(), verified)
        .await
        .unwrap();

    // Cached snapshot is unchanged until the next fetch.
    assert_eq!(
        user.kyc.status(parent, KycDocumentType::PanCard),
        DocumentStatus::Pending
    );

    user.kyc.fetch(&user.ctx, parent).await.unwrap();
    assert!(user.kyc.is_complete(parent));
    assert!(
        !user
            .kyc
            .outstanding(parent)
            .contains(&KycDocumentType::PanCard)
    );
}

#[tokio::test]
async fn test_load_paperwork_is_attached_to_the_load() {
    let market = TestMarketplace::new();
    let shipper = market.user(UserRole::Shipper);
    let load = shipper
        .loads
        .post(&shipper.ctx, &load_draft("Surat", "Jaipur"))
        .await
        .unwrap();

    let receipt = shipper
        .paperwork
        .upload(
            &shipper.ctx,
            pdf(load.id.into_uuid(), LoadDocumentType::LorryReceipt),
        )
        .await
        .unwrap();

    assert_eq!(receipt.parent_id, load.id.into_uuid());
    assert_eq!(market.blobs.keys("load-documents").len(), 1);
    assert_eq!(
        shipper
            .paperwork
            .status(load.id.into_uuid(), LoadDocumentType::LorryReceipt),
        DocumentStatus::Pending
    );
    assert_eq!(
        shipper.paperwork.outstanding(load.id.into_uuid()),
        vec![
            LoadDocumentType::Invoice,
            LoadDocumentType::EwayBill,
            LoadDocumentType::ProofOfDelivery,
            LoadDocumentType::WeightSlip,
        ]
    );
}

#[tokio::test]
async fn test_reupload_replaces_the_slot() {
    let market = TestMarketplace::new();
    let user = market.user(UserRole::FleetOwner);
    let parent = user.id.into_uuid();

    user.kyc
        .upload(&user.ctx, pdf(parent, KycDocumentType::VehicleRc))
        .await
        .unwrap();
    let mut second = pdf(parent, KycDocumentType::VehicleRc);
    second.file_name = "rc-front.png".to_string();
    second.data = Bytes::from_static(b"\x89PNG");
    let document = user.kyc.upload(&user.ctx, second).await.unwrap();

    assert_eq!(market.store.row_count("kyc_documents"), 1);
    assert_eq!(document.file_name.as_deref(), Some("rc-front.png"));
    assert_eq!(user.kyc.documents(parent).len(), 1);
}
