//! Document categories and their fixed sets of document types.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use haulmark_core::AppError;

/// A fixed document type within a category (e.g. `pan_card`).
pub trait DocumentKind:
    Copy + Eq + Hash + Debug + Display + FromStr<Err = AppError> + Send + Sync + 'static
{
    /// Every type of the category, in display order.
    fn all() -> &'static [Self];

    /// Wire name stored in the `document_type` column.
    fn as_str(&self) -> &'static str;

    /// Human-readable name.
    fn label(&self) -> &'static str;

    /// Whether verification of this type is mandatory for the category.
    fn is_required(&self) -> bool;
}

/// A family of documents stored in one collection and one bucket.
pub trait DocumentCategory: Send + Sync + Debug + 'static {
    /// The document types of this category.
    type Kind: DocumentKind;

    /// Metadata collection.
    const TABLE: &'static str;
    /// Default blob bucket.
    const BUCKET: &'static str;
    /// Column holding the parent record id.
    const PARENT_FIELD: &'static str;
    /// Human-readable name used in notifications.
    const LABEL: &'static str;
}

/// Know-your-customer documents, attached to a user.
#[derive(Debug, Clone, Copy)]
pub struct Kyc;

impl DocumentCategory for Kyc {
    type Kind = KycDocumentType;

    const TABLE: &'static str = "kyc_documents";
    const BUCKET: &'static str = "kyc-documents";
    const PARENT_FIELD: &'static str = "user_id";
    const LABEL: &'static str = "KYC document";
}

/// Shipment paperwork, attached to a load.
#[derive(Debug, Clone, Copy)]
pub struct LoadPaperwork;

impl DocumentCategory for LoadPaperwork {
    type Kind = LoadDocumentType;

    const TABLE: &'static str = "load_documents";
    const BUCKET: &'static str = "load-documents";
    const PARENT_FIELD: &'static str = "load_id";
    const LABEL: &'static str = "Load document";
}

/// KYC document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycDocumentType {
    /// Permanent Account Number card.
    PanCard,
    /// National identity card.
    AadhaarCard,
    /// Driving licence.
    DrivingLicense,
    /// GST registration certificate.
    GstCertificate,
    /// Vehicle registration certificate.
    VehicleRc,
    /// Cancelled cheque for payouts.
    CancelledCheque,
}

const KYC_TYPES: &[KycDocumentType] = &[
    KycDocumentType::PanCard,
    KycDocumentType::AadhaarCard,
    KycDocumentType::DrivingLicense,
    KycDocumentType::GstCertificate,
    KycDocumentType::VehicleRc,
    KycDocumentType::CancelledCheque,
];

impl DocumentKind for KycDocumentType {
    fn all() -> &'static [Self] {
        KYC_TYPES
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::PanCard => "pan_card",
            Self::AadhaarCard => "aadhaar_card",
            Self::DrivingLicense => "driving_license",
            Self::GstCertificate => "gst_certificate",
            Self::VehicleRc => "vehicle_rc",
            Self::CancelledCheque => "cancelled_cheque",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::PanCard => "PAN Card",
            Self::AadhaarCard => "Aadhaar Card",
            Self::DrivingLicense => "Driving License",
            Self::GstCertificate => "GST Certificate",
            Self::VehicleRc => "Vehicle RC",
            Self::CancelledCheque => "Cancelled Cheque",
        }
    }

    fn is_required(&self) -> bool {
        matches!(self, Self::PanCard | Self::AadhaarCard)
    }
}

impl Display for KycDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KycDocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KYC_TYPES
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown KYC document type: '{s}'")))
    }
}

/// Load paperwork types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadDocumentType {
    /// Lorry receipt issued at pickup.
    LorryReceipt,
    /// Commercial invoice.
    Invoice,
    /// E-way bill for interstate movement.
    EwayBill,
    /// Signed proof of delivery.
    ProofOfDelivery,
    /// Weighbridge slip.
    WeightSlip,
}

const LOAD_TYPES: &[LoadDocumentType] = &[
    LoadDocumentType::LorryReceipt,
    LoadDocumentType::Invoice,
    LoadDocumentType::EwayBill,
    LoadDocumentType::ProofOfDelivery,
    LoadDocumentType::WeightSlip,
];

impl DocumentKind for LoadDocumentType {
    fn all() -> &'static [Self] {
        LOAD_TYPES
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::LorryReceipt => "lorry_receipt",
            Self::Invoice => "invoice",
            Self::EwayBill => "eway_bill",
            Self::ProofOfDelivery => "proof_of_delivery",
            Self::WeightSlip => "weight_slip",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::LorryReceipt => "Lorry Receipt",
            Self::Invoice => "Invoice",
            Self::EwayBill => "E-way Bill",
            Self::ProofOfDelivery => "Proof of Delivery",
            Self::WeightSlip => "Weight Slip",
        }
    }

    fn is_required(&self) -> bool {
        matches!(self, Self::LorryReceipt | Self::ProofOfDelivery)
    }
}

impl Display for LoadDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoadDocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LOAD_TYPES
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown load document type: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for kind in KycDocumentType::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        for kind in LoadDocumentType::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "pan_card".parse::<KycDocumentType>().unwrap(),
            KycDocumentType::PanCard
        );
        assert!("passport".parse::<KycDocumentType>().is_err());
        assert_eq!(
            "eway_bill".parse::<LoadDocumentType>().unwrap(),
            LoadDocumentType::EwayBill
        );
    }
}
