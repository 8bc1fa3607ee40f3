//! Driver management CLI commands.

use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use haulmark_core::result::AppResult;
use haulmark_core::types::{DriverId, TruckId};
use haulmark_entity::driver::{Driver, DriverStatus, NewDriver};
use haulmark_service::FleetService;

use super::Session;
use crate::output::{self, OutputFormat, cell};

/// Arguments for driver commands
#[derive(Debug, Args)]
pub struct DriverArgs {
    /// Driver subcommand
    #[command(subcommand)]
    pub command: DriverCommand,
}

/// Driver subcommands
#[derive(Debug, Subcommand)]
pub enum DriverCommand {
    /// List your drivers
    List,
    /// List drivers free and not on a truck
    Unassigned,
    /// List drivers whose licence has lapsed
    Expired {
        /// Check against this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Add a driver
    Add {
        /// Full name
        #[arg(long)]
        name: String,
        /// Phone number
        #[arg(long)]
        phone: String,
        /// Licence number
        #[arg(long)]
        license: String,
        /// Licence expiry date (YYYY-MM-DD)
        #[arg(long)]
        license_expiry: Option<NaiveDate>,
    },
    /// Put a driver on a truck
    Assign {
        /// Driver id
        driver: DriverId,
        /// Truck id
        truck: TruckId,
    },
    /// Remove a driver
    Remove {
        /// Driver id
        id: DriverId,
    },
}

/// Driver display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct DriverRow {
    /// Driver ID
    id: String,
    /// Full name
    name: String,
    /// Phone
    phone: String,
    /// Licence number
    license: String,
    /// Licence expiry
    expires: String,
    /// Assigned truck
    truck: String,
    /// Status
    status: String,
}

impl From<&Driver> for DriverRow {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id.to_string(),
            name: cell(driver.full_name.as_deref()),
            phone: cell(driver.phone.as_deref()),
            license: cell(driver.license_number.as_deref()),
            expires: cell(driver.license_expiry),
            truck: cell(driver.assigned_truck_id),
            status: driver.status.unwrap_or_default().to_string(),
        }
    }
}

/// Execute driver commands
pub async fn execute(
    args: &DriverArgs,
    session: &Session,
    format: OutputFormat,
) -> AppResult<()> {
    let fleet = FleetService::new(session.records.clone(), session.notifier.clone());
    let ctx = &session.ctx;

    match &args.command {
        DriverCommand::List => {
            let drivers = fleet.drivers().fetch_list(ctx).await?;
            let rows: Vec<DriverRow> = drivers.iter().map(DriverRow::from).collect();
            output::print_list(&rows, format);
        }
        DriverCommand::Unassigned => {
            fleet.drivers().fetch_list(ctx).await?;
            let rows: Vec<DriverRow> = fleet
                .unassigned_drivers()
                .iter()
                .map(DriverRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        DriverCommand::Expired { on } => {
            fleet.drivers().fetch_list(ctx).await?;
            let today = on.unwrap_or_else(|| Utc::now().date_naive());
            let expired = fleet.expired_licenses(today);
            if expired.is_empty() && format == OutputFormat::Table {
                output::print_success(&format!("All licences valid on {today}"));
            } else {
                let rows: Vec<DriverRow> = expired.iter().map(DriverRow::from).collect();
                output::print_list(&rows, format);
            }
        }
        DriverCommand::Add {
            name,
            phone,
            license,
            license_expiry,
        } => {
            let draft = NewDriver {
                full_name: name.clone(),
                phone: phone.clone(),
                license_number: license.clone(),
                license_expiry: *license_expiry,
                assigned_truck_id: None,
                status: DriverStatus::Available,
            };
            let driver = fleet.drivers().create(ctx, &draft).await?;
            output::print_item(&DriverRow::from(&driver), format);
        }
        DriverCommand::Assign { driver, truck } => {
            let driver = fleet.assign_driver(ctx, *driver, *truck).await?;
            output::print_item(&DriverRow::from(&driver), format);
        }
        DriverCommand::Remove { id } => {
            fleet.drivers().delete(ctx, *id).await?;
        }
    }

    Ok(())
}
