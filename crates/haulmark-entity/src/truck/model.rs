//! Truck record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use haulmark_core::types::{TruckId, UserId};

use super::status::TruckStatus;
use crate::record::Entity;

/// A truck registered by a fleet owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    /// Server-assigned identifier.
    pub id: TruckId,
    /// The fleet owner.
    pub owner_id: Option<UserId>,
    /// Vehicle registration plate.
    pub registration_number: Option<String>,
    /// Body type (open, container, trailer, tanker, ...).
    pub truck_type: Option<String>,
    /// Payload capacity in metric tons.
    pub capacity_tons: Option<f64>,
    /// Last reported location, free text.
    pub current_location: Option<String>,
    /// Operational status.
    pub status: Option<TruckStatus>,
    /// When the record was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Truck {
    type Id = TruckId;
    type Draft = NewTruck;

    const TABLE: &'static str = "enhanced_trucks";
    const OWNER_FIELD: &'static str = "owner_id";
    const LABEL: &'static str = "Truck";

    fn id(&self) -> TruckId {
        self.id
    }

    fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }
}

/// Fields required to register a truck.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTruck {
    /// Vehicle registration plate.
    #[validate(length(min = 4, max = 15, message = "Registration number must be 4-15 characters"))]
    pub registration_number: String,
    /// Body type.
    #[validate(length(min = 1, message = "Truck type is required"))]
    pub truck_type: String,
    /// Payload capacity in metric tons.
    #[validate(range(min = 0.5, max = 100.0, message = "Capacity must be between 0.5 and 100 tons"))]
    pub capacity_tons: f64,
    /// Last reported location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    /// Initial status.
    #[serde(default)]
    pub status: TruckStatus,
}

/// Partial update of a truck. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TruckPatch {
    /// New registration plate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    /// New body type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truck_type: Option<String>,
    /// New capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_tons: Option<f64>,
    /// New location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TruckStatus>,
}
