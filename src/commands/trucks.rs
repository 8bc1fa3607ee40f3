//! Truck management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use haulmark_core::result::AppResult;
use haulmark_core::types::TruckId;
use haulmark_entity::truck::{NewTruck, Truck, TruckStatus};
use haulmark_service::FleetService;

use super::Session;
use crate::output::{self, OutputFormat, cell};

/// Arguments for truck commands
#[derive(Debug, Args)]
pub struct TruckArgs {
    /// Truck subcommand
    #[command(subcommand)]
    pub command: TruckCommand,
}

/// Truck subcommands
#[derive(Debug, Subcommand)]
pub enum TruckCommand {
    /// List your trucks
    List,
    /// List trucks free to take a load
    Available,
    /// Register a truck
    Add {
        /// Registration number
        #[arg(long)]
        registration: String,
        /// Body type, e.g. "open", "container"
        #[arg(long = "type")]
        truck_type: String,
        /// Capacity in tons
        #[arg(long)]
        capacity: f64,
        /// Where the truck is now
        #[arg(long)]
        location: Option<String>,
    },
    /// Change a truck's status
    Status {
        /// Truck id
        id: TruckId,
        /// available, on_trip, maintenance or inactive
        status: TruckStatus,
    },
    /// Remove a truck
    Remove {
        /// Truck id
        id: TruckId,
    },
}

/// Truck display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct TruckRow {
    /// Truck ID
    id: String,
    /// Registration number
    registration: String,
    /// Body type
    #[tabled(rename = "type")]
    truck_type: String,
    /// Capacity in tons
    capacity: String,
    /// Current location
    location: String,
    /// Status
    status: String,
}

impl From<&Truck> for TruckRow {
    fn from(truck: &Truck) -> Self {
        Self {
            id: truck.id.to_string(),
            registration: cell(truck.registration_number.as_deref()),
            truck_type: cell(truck.truck_type.as_deref()),
            capacity: cell(truck.capacity_tons),
            location: cell(truck.current_location.as_deref()),
            status: truck.status.unwrap_or_default().to_string(),
        }
    }
}

/// Execute truck commands
pub async fn execute(
    args: &TruckArgs,
    session: &Session,
    format: OutputFormat,
) -> AppResult<()> {
    let fleet = FleetService::new(session.records.clone(), session.notifier.clone());
    let ctx = &session.ctx;

    match &args.command {
        TruckCommand::List => {
            let trucks = fleet.trucks().fetch_list(ctx).await?;
            let rows: Vec<TruckRow> = trucks.iter().map(TruckRow::from).collect();
            output::print_list(&rows, format);
        }
        TruckCommand::Available => {
            fleet.trucks().fetch_list(ctx).await?;
            let rows: Vec<TruckRow> = fleet.available_trucks().iter().map(TruckRow::from).collect();
            output::print_list(&rows, format);
        }
        TruckCommand::Add {
            registration,
            truck_type,
            capacity,
            location,
        } => {
            let draft = NewTruck {
                registration_number: registration.clone(),
                truck_type: truck_type.clone(),
                capacity_tons: *capacity,
                current_location: location.clone(),
                status: TruckStatus::Available,
            };
            let truck = fleet.trucks().create(ctx, &draft).await?;
            output::print_item(&TruckRow::from(&truck), format);
        }
        TruckCommand::Status { id, status } => {
            let truck = fleet.set_truck_status(ctx, *id, *status).await?;
            output::print_item(&TruckRow::from(&truck), format);
        }
        TruckCommand::Remove { id } => {
            fleet.trucks().delete(ctx, *id).await?;
        }
    }

    Ok(())
}
