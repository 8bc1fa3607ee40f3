//! Driver record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use haulmark_core::types::{DriverId, TruckId, UserId};

use crate::record::Entity;

/// Duty status of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    /// Free to be assigned.
    #[default]
    Available,
    /// Driving an assigned load.
    OnTrip,
    /// Not working.
    OffDuty,
}

impl DriverStatus {
    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnTrip => "on_trip",
            Self::OffDuty => "off_duty",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = haulmark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "on_trip" => Ok(Self::OnTrip),
            "off_duty" => Ok(Self::OffDuty),
            _ => Err(haulmark_core::AppError::validation(format!(
                "Invalid driver status: '{s}'"
            ))),
        }
    }
}

/// A driver on a fleet owner's roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Server-assigned identifier.
    pub id: DriverId,
    /// The fleet owner who added the driver.
    pub owner_id: Option<UserId>,
    /// Full name.
    pub full_name: Option<String>,
    /// Contact number.
    pub phone: Option<String>,
    /// Driving licence number.
    pub license_number: Option<String>,
    /// Licence expiry date.
    pub license_expiry: Option<NaiveDate>,
    /// Truck the driver is currently assigned to.
    pub assigned_truck_id: Option<TruckId>,
    /// Duty status.
    pub status: Option<DriverStatus>,
    /// When the record was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Driver {
    /// Whether the licence has expired as of `today`. Unknown expiry is not expired.
    pub fn license_expired(&self, today: NaiveDate) -> bool {
        self.license_expiry.is_some_and(|expiry| expiry < today)
    }
}

impl Entity for Driver {
    type Id = DriverId;
    type Draft = NewDriver;

    const TABLE: &'static str = "enhanced_drivers";
    const OWNER_FIELD: &'static str = "owner_id";
    const LABEL: &'static str = "Driver";

    fn id(&self) -> DriverId {
        self.id
    }

    fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }
}

/// Fields required to add a driver.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDriver {
    /// Full name.
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub full_name: String,
    /// Contact number.
    #[validate(length(min = 10, max = 15, message = "Phone must be 10-15 digits"))]
    pub phone: String,
    /// Driving licence number.
    #[validate(length(min = 5, max = 20, message = "Licence number must be 5-20 characters"))]
    pub license_number: String,
    /// Licence expiry date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_expiry: Option<NaiveDate>,
    /// Initial truck assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_truck_id: Option<TruckId>,
    /// Initial status.
    #[serde(default)]
    pub status: DriverStatus,
}

/// Partial update of a driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverPatch {
    /// New contact number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New licence expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_expiry: Option<NaiveDate>,
    /// New truck assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_truck_id: Option<TruckId>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DriverStatus>,
}
