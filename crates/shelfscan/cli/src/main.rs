//! Shelfscan CLI - bookshelf scanning from the terminal
//!
//! This CLI lets a reader:
//! - Inspect, refresh or reset the anonymous device identity
//! - Analyze a shelf photo against their reading preferences
//! - Import preferences from a Goodreads export
//! - Browse analysis history and manage saved books

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use shelfscan_client::{ClientConfig, ShelfClient};
use shelfscan_identity::IdentityConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;
mod profile;

use commands::{analyze, device, history, saved};
use config::CliConfig;
use error::{CliError, CliResult};
use output::print_error;
use profile::Profile;

/// Shelfscan CLI application
#[derive(Parser)]
#[command(name = "shelfscan")]
#[command(about = "Shelfscan - find your next book on someone else's shelf", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SHELFSCAN_CONFIG")]
    config: Option<String>,

    /// Backend endpoint
    #[arg(short, long, env = "SHELFSCAN_ENDPOINT")]
    endpoint: Option<String>,

    /// Profile directory holding the device identity
    #[arg(long, env = "SHELFSCAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Device identity management
    Device {
        #[command(subcommand)]
        command: device::DeviceCommands,
    },

    /// Analyze a shelf photo
    Analyze(analyze::AnalyzeArgs),

    /// Import reading preferences from a Goodreads CSV export
    ImportGoodreads {
        /// Goodreads library export (.csv, up to 50MB)
        path: PathBuf,
    },

    /// Show analysis history for this device
    History,

    /// Manage saved books
    Saved {
        #[command(subcommand)]
        command: saved::SavedCommands,
    },

    /// Show configuration
    Config,

    /// Check backend connectivity
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    // Load config
    let config = CliConfig::load(cli.config.as_deref())?;
    let data_dir = config.resolve_data_dir(cli.data_dir.clone())?;
    let identity_config = IdentityConfig {
        require_persistence: config.require_persistence.unwrap_or(false),
        ..IdentityConfig::default()
    };
    let mut client_config = ClientConfig {
        ready_wait_ms: config.ready_wait_ms,
        ..ClientConfig::default()
    };
    if let Some(endpoint) = cli.endpoint.clone().or(config.endpoint.clone()) {
        client_config.base_url = endpoint;
    }
    if let Some(timeout) = config.timeout_seconds {
        client_config.timeout_secs = timeout;
    }

    tracing::debug!(
        endpoint = %client_config.base_url,
        profile = %data_dir.display(),
        "resolved configuration"
    );

    let profile = Profile::open(&data_dir, identity_config);
    let client = ShelfClient::new(client_config.clone(), Arc::clone(profile.gate()))?;

    // Execute command
    match cli.command {
        Commands::Device { command } => device::execute(command, &profile, cli.output).await,
        Commands::Config => {
            println!("Endpoint: {}", client_config.base_url);
            println!("Profile:  {}", data_dir.display());
            println!("Config:   {:?}", config);
            Ok(())
        }
        Commands::Status => {
            let status = client.health_check().await.map_err(|e| {
                CliError::Config(format!("Cannot connect to backend at {}: {}", client.base_url(), e))
            })?;
            output::print_success(&format!("Backend is healthy: {}", status.status));
            Ok(())
        }
        command => {
            // Everything below sends identity-bound requests.
            profile.start()?;
            match command {
                Commands::Analyze(args) => analyze::execute(args, &client, cli.output).await,
                Commands::ImportGoodreads { path } => {
                    analyze::import_goodreads(path, &client, cli.output).await
                }
                Commands::History => history::execute(&client, cli.output).await,
                Commands::Saved { command } => saved::execute(command, &client, cli.output).await,
                Commands::Device { .. } | Commands::Config | Commands::Status => Ok(()),
            }
        }
    }
}
