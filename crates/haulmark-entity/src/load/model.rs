//! Load record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use haulmark_core::types::{DriverId, LoadId, TruckId, UserId};

use super::status::LoadStatus;
use crate::record::Entity;

/// A shipment posted by a shipper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// Server-assigned identifier.
    pub id: LoadId,
    /// The shipper who posted the load.
    pub shipper_id: Option<UserId>,
    /// Pickup location.
    pub origin: Option<String>,
    /// Drop location.
    pub destination: Option<String>,
    /// Requested pickup date.
    pub pickup_date: Option<NaiveDate>,
    /// What is being shipped.
    pub material: Option<String>,
    /// Weight in metric tons.
    pub weight_tons: Option<f64>,
    /// Offered freight price.
    pub price: Option<f64>,
    /// Lifecycle status.
    pub status: Option<LoadStatus>,
    /// The fleet owner who accepted the load.
    pub transporter_id: Option<UserId>,
    /// Assigned truck.
    pub assigned_truck_id: Option<TruckId>,
    /// Assigned driver.
    pub assigned_driver_id: Option<DriverId>,
    /// When the record was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Load {
    /// Status with the store default applied.
    pub fn effective_status(&self) -> LoadStatus {
        self.status.unwrap_or_default()
    }
}

impl Entity for Load {
    type Id = LoadId;
    type Draft = NewLoad;

    const TABLE: &'static str = "enhanced_loads";
    const OWNER_FIELD: &'static str = "shipper_id";
    const LABEL: &'static str = "Load";

    fn id(&self) -> LoadId {
        self.id
    }

    fn owner_id(&self) -> Option<UserId> {
        self.shipper_id
    }
}

/// Fields required to post a load.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewLoad {
    /// Pickup location.
    #[validate(length(min = 2, message = "Origin is required"))]
    pub origin: String,
    /// Drop location.
    #[validate(length(min = 2, message = "Destination is required"))]
    pub destination: String,
    /// Requested pickup date.
    pub pickup_date: NaiveDate,
    /// What is being shipped.
    #[validate(length(min = 1, message = "Material is required"))]
    pub material: String,
    /// Weight in metric tons.
    #[validate(range(min = 0.1, max = 100.0, message = "Weight must be between 0.1 and 100 tons"))]
    pub weight_tons: f64,
    /// Offered freight price.
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    /// Initial status.
    #[serde(default)]
    pub status: LoadStatus,
}

/// Partial update of a load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadPatch {
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LoadStatus>,
    /// New price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New pickup date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<NaiveDate>,
    /// Accepting fleet owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transporter_id: Option<UserId>,
    /// Assigned truck.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_truck_id: Option<TruckId>,
    /// Assigned driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<DriverId>,
}

impl LoadPatch {
    /// A patch that only changes the status.
    pub fn status(status: LoadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
