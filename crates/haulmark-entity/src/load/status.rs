//! Load lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a load is in its journey.
///
/// Transitions are validated by the remote store's policies; the client
/// submits whatever status the user picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Visible on the marketplace, waiting for a transporter.
    #[default]
    Posted,
    /// A truck and driver have been assigned.
    Assigned,
    /// Picked up and on the road.
    InTransit,
    /// Handed over at the destination.
    Delivered,
    /// Withdrawn by the shipper.
    Cancelled,
}

impl LoadStatus {
    /// Whether the load can still be picked up by a transporter.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Posted)
    }

    /// Whether the load has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Assigned => "assigned",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = haulmark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "posted" => Ok(Self::Posted),
            "assigned" => Ok(Self::Assigned),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(haulmark_core::AppError::validation(format!(
                "Invalid load status: '{s}'. Expected one of: posted, assigned, in_transit, delivered, cancelled"
            ))),
        }
    }
}
