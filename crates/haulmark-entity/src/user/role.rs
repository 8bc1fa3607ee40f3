//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The side of the marketplace a user acts on, chosen at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Posts loads and pays for transport.
    #[default]
    Shipper,
    /// Owns trucks and employs drivers; bids on loads.
    FleetOwner,
    /// Drives assigned trucks.
    Driver,
    /// Platform staff; reviews KYC submissions.
    Admin,
}

impl UserRole {
    /// Whether the role manages a fleet (trucks and drivers).
    pub fn manages_fleet(&self) -> bool {
        matches!(self, Self::FleetOwner | Self::Admin)
    }

    /// Whether the role may post loads.
    pub fn posts_loads(&self) -> bool {
        matches!(self, Self::Shipper | Self::Admin)
    }

    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipper => "shipper",
            Self::FleetOwner => "fleet_owner",
            Self::Driver => "driver",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = haulmark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "shipper" => Ok(Self::Shipper),
            "fleet_owner" | "transporter" => Ok(Self::FleetOwner),
            "driver" => Ok(Self::Driver),
            "admin" => Ok(Self::Admin),
            _ => Err(haulmark_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: shipper, fleet_owner, driver, admin"
            ))),
        }
    }
}
