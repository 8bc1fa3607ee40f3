//! CLI command definitions and dispatch.

pub mod config;
pub mod documents;
pub mod drivers;
pub mod kyc;
pub mod load_docs;
pub mod loads;
pub mod trucks;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use haulmark_core::config::AppConfig;
use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::traits::{BlobStore, RecordStore, Severity};
use haulmark_core::types::UserId;
use haulmark_entity::user::UserRole;
use haulmark_service::{MemoryNotifier, RequestContext};

use crate::output::{self, OutputFormat};

/// Haulmark: freight marketplace client
#[derive(Debug, Parser)]
#[command(name = "haulmark", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and per-environment overlays
    #[arg(short, long, env = "HAULMARK_CONFIG_DIR", default_value = "config")]
    pub config: String,

    /// Configuration environment overlay to apply
    #[arg(short, long, env = "HAULMARK_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Acting user id
    #[arg(long, env = "HAULMARK_USER_ID")]
    pub user: Option<UserId>,

    /// Acting user's marketplace role
    #[arg(long, env = "HAULMARK_ROLE", default_value = "shipper")]
    pub role: UserRole,

    /// Session token for the hosted backend
    #[arg(long, env = "HAULMARK_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Truck management
    Trucks(trucks::TruckArgs),
    /// Driver management
    Drivers(drivers::DriverArgs),
    /// Posting and browsing loads
    Loads(loads::LoadArgs),
    /// KYC document uploads and status
    Kyc(kyc::KycArgs),
    /// Paperwork attached to a load
    LoadDocs(load_docs::LoadDocArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load configuration for the selected environment
    pub fn load_config(&self) -> AppResult<AppConfig> {
        AppConfig::load_from(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), Failure> {
        if let Commands::Config(args) = &self.command {
            return Ok(config::execute(args, &config, &self.config, self.format).await?);
        }

        config.validate()?;
        let session = Session::open(self, config).await?;
        run(&self.command, &session, self.format).await
    }
}

/// A failed command.
#[derive(Debug)]
pub struct Failure {
    /// What went wrong
    pub error: AppError,
    /// Whether an error notification already told the user
    pub reported: bool,
}

impl From<AppError> for Failure {
    fn from(error: AppError) -> Self {
        Self {
            error,
            reported: false,
        }
    }
}

/// Run a session command, then print its notifications.
async fn run(command: &Commands, session: &Session, format: OutputFormat) -> Result<(), Failure> {
    let result = match command {
        Commands::Trucks(args) => trucks::execute(args, session, format).await,
        Commands::Drivers(args) => drivers::execute(args, session, format).await,
        Commands::Loads(args) => loads::execute(args, session, format).await,
        Commands::Kyc(args) => kyc::execute(args, session, format).await,
        Commands::LoadDocs(args) => load_docs::execute(args, session, format).await,
        Commands::Config(_) => Ok(()),
    };
    let reported = session.flush_notifications();
    result.map_err(|error| Failure { error, reported })
}

/// Backends and identity shared by every command in one invocation.
#[derive(Debug)]
pub struct Session {
    /// The acting caller
    pub ctx: RequestContext,
    /// Record store handle authenticated as the caller
    pub records: Arc<dyn RecordStore>,
    /// Blob store handle
    pub blobs: Arc<dyn BlobStore>,
    /// Collected user-facing messages
    pub notifier: Arc<MemoryNotifier>,
    /// Loaded configuration
    pub config: AppConfig,
}

impl Session {
    async fn open(cli: &Cli, config: AppConfig) -> AppResult<Self> {
        let ctx = match cli.user {
            Some(user) => RequestContext::authenticated(user, cli.role),
            None => RequestContext::anonymous(),
        };
        let ctx = match &cli.access_token {
            Some(token) => ctx.with_access_token(token.clone()),
            None => ctx,
        };

        let records =
            haulmark_database::connect(&config.store, cli.access_token.clone(), cli.user)?;
        let blobs = haulmark_storage::create_blob_store(
            &config.storage,
            &config.store,
            cli.access_token.clone(),
        )
        .await?;

        tracing::debug!(
            user = ?ctx.user_id,
            role = %ctx.role,
            records = records.backend_type(),
            blobs = blobs.provider_type(),
            "Session opened"
        );

        Ok(Self {
            ctx,
            records,
            blobs,
            notifier: Arc::new(MemoryNotifier::new()),
            config,
        })
    }

    /// Print and clear every notification raised so far. Returns whether
    /// any of them was an error.
    pub fn flush_notifications(&self) -> bool {
        let mut saw_error = false;
        for notification in self.notifier.take() {
            saw_error |= notification.severity == Severity::Error;
            output::print_notification(&notification);
        }
        saw_error
    }
}
