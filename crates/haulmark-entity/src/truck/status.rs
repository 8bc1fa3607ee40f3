//! Truck availability status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational status of a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckStatus {
    /// Ready to take a load.
    #[default]
    Available,
    /// Currently hauling a load.
    OnTrip,
    /// In the workshop.
    Maintenance,
    /// Retired or parked.
    Inactive,
}

impl TruckStatus {
    /// Whether the truck can be assigned to a load.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnTrip => "on_trip",
            Self::Maintenance => "maintenance",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TruckStatus {
    type Err = haulmark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "on_trip" => Ok(Self::OnTrip),
            "maintenance" => Ok(Self::Maintenance),
            "inactive" => Ok(Self::Inactive),
            _ => Err(haulmark_core::AppError::validation(format!(
                "Invalid truck status: '{s}'"
            ))),
        }
    }
}
