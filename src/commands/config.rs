//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use haulmark_core::config::AppConfig;
use haulmark_core::error::{AppError, ErrorKind};
use haulmark_core::result::AppResult;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Validate the merged configuration
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_dir: &str,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.store.anon_key = mask_secret(&shown.store.anon_key);
            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    let toml = toml::to_string_pretty(&shown).map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Serialization,
                            "Failed to render configuration",
                            e,
                        )
                    })?;
                    println!("{toml}");
                }
            }
        }
        ConfigCommand::Validate => match config.validate() {
            Ok(()) => {
                output::print_success(&format!("Configuration in '{config_dir}' is valid"));
                output::print_kv("Record store", &format!("{:?}", config.store.backend));
                if !config.store.url.is_empty() {
                    output::print_kv("Store URL", &config.store.url);
                    output::print_kv("Anon key", &mask_secret(&config.store.anon_key));
                }
                output::print_kv("Blob storage", &format!("{:?}", config.storage.backend));
                output::print_kv(
                    "Max upload",
                    &format!("{} bytes", config.storage.max_upload_size_bytes),
                );
                output::print_kv("Log level", &config.logging.level);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Failed to create directory", e)
                })?;
            }

            tokio::fs::write(out_path, default_config).await.map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to write config", e)
            })?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}

/// Keep only the last four characters of a secret for display.
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{tail}")
}
