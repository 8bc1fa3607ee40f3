//! Haulmark command-line client.
//!
//! Wires configuration, logging, the record and blob store backends and the
//! marketplace services together, then runs one subcommand.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use haulmark_core::config::AppConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(failure) = cli.execute(config).await {
        tracing::debug!(
            kind = %failure.error.kind,
            reported = failure.reported,
            "Command failed"
        );
        if !failure.reported {
            output::print_error(&failure.error.to_string());
        }
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. Logs go to stderr so command output stays clean.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
