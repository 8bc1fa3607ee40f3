//! Load posting and marketplace CLI commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use haulmark_core::result::AppResult;
use haulmark_core::types::{DriverId, LoadId, TruckId};
use haulmark_entity::load::{Load, LoadStatus, NewLoad};
use haulmark_service::LoadService;

use super::Session;
use crate::output::{self, OutputFormat, cell};

/// Arguments for load commands
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Load subcommand
    #[command(subcommand)]
    pub command: LoadCommand,
}

/// Load subcommands
#[derive(Debug, Subcommand)]
pub enum LoadCommand {
    /// List loads you posted
    Mine,
    /// Browse open loads on the marketplace
    Open {
        /// Origin contains this text
        #[arg(long)]
        from: Option<String>,
        /// Destination contains this text
        #[arg(long)]
        to: Option<String>,
    },
    /// Post a new load
    Post {
        /// Pickup city
        #[arg(long)]
        from: String,
        /// Drop city
        #[arg(long)]
        to: String,
        /// Pickup date (YYYY-MM-DD)
        #[arg(long)]
        pickup: NaiveDate,
        /// What is being carried
        #[arg(long)]
        material: String,
        /// Weight in tons
        #[arg(long)]
        weight: f64,
        /// Offered price
        #[arg(long)]
        price: f64,
    },
    /// Move a load to another status
    Status {
        /// Load id
        id: LoadId,
        /// posted, assigned, in_transit, delivered or cancelled
        status: LoadStatus,
    },
    /// Assign a truck and driver to a load
    Assign {
        /// Load id
        id: LoadId,
        /// Truck id
        #[arg(long)]
        truck: TruckId,
        /// Driver id
        #[arg(long)]
        driver: DriverId,
    },
    /// Withdraw a load
    Cancel {
        /// Load id
        id: LoadId,
    },
}

/// Load display row for table output
#[derive(Debug, Serialize, Tabled)]
pub struct LoadRow {
    /// Load ID
    id: String,
    /// Origin
    from: String,
    /// Destination
    to: String,
    /// Pickup date
    pickup: String,
    /// Material
    material: String,
    /// Weight in tons
    weight: String,
    /// Price
    price: String,
    /// Status
    status: String,
}

impl From<&Load> for LoadRow {
    fn from(load: &Load) -> Self {
        Self {
            id: load.id.to_string(),
            from: cell(load.origin.as_deref()),
            to: cell(load.destination.as_deref()),
            pickup: cell(load.pickup_date),
            material: cell(load.material.as_deref()),
            weight: cell(load.weight_tons),
            price: cell(load.price.map(|p| format!("{p:.2}"))),
            status: load.effective_status().to_string(),
        }
    }
}

fn print_loads(loads: &[Load], format: OutputFormat) {
    let rows: Vec<LoadRow> = loads.iter().map(LoadRow::from).collect();
    output::print_list(&rows, format);
}

/// Execute load commands
pub async fn execute(
    args: &LoadArgs,
    session: &Session,
    format: OutputFormat,
) -> AppResult<()> {
    let loads = LoadService::new(session.records.clone(), session.notifier.clone());
    let ctx = &session.ctx;

    match &args.command {
        LoadCommand::Mine => {
            let mine = loads.mine().fetch_list(ctx).await?;
            print_loads(&mine, format);
        }
        LoadCommand::Open { from, to } => {
            loads.marketplace().fetch_list(ctx).await?;
            print_loads(&loads.search_open(from.as_deref(), to.as_deref()), format);
        }
        LoadCommand::Post {
            from,
            to,
            pickup,
            material,
            weight,
            price,
        } => {
            if !ctx.role.posts_loads() {
                output::print_warning(&format!("Posting loads as a {}", ctx.role));
            }
            let draft = NewLoad {
                origin: from.clone(),
                destination: to.clone(),
                pickup_date: *pickup,
                material: material.clone(),
                weight_tons: *weight,
                price: *price,
                status: LoadStatus::Posted,
            };
            let load = loads.post(ctx, &draft).await?;
            output::print_item(&LoadRow::from(&load), format);
        }
        LoadCommand::Status { id, status } => {
            let load = loads.update_status(ctx, *id, *status).await?;
            output::print_item(&LoadRow::from(&load), format);
        }
        LoadCommand::Assign { id, truck, driver } => {
            let load = loads.assign(ctx, *id, *truck, *driver).await?;
            output::print_item(&LoadRow::from(&load), format);
        }
        LoadCommand::Cancel { id } => {
            let load = loads.cancel(ctx, *id).await?;
            output::print_item(&LoadRow::from(&load), format);
        }
    }

    Ok(())
}
