//! SIEM Snapshot API Server
//! Serves dashboard telemetry snapshots and builds the Suricata rules snapshot

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use siem_snapshot_api::config::{Config, LoggingConfig};
use siem_snapshot_api::rulebook::{self, RuleBook};
use siem_snapshot_api::{create_app, AppState, Category, FileStorage, RetrievalService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "snapshot_server")]
#[command(version, about = "Read-only JSON API over SIEM telemetry snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, env = "SNAPSHOT_API_CONFIG", default_value = "config.toml")]
    config: PathBuf,
    /// Override the snapshot data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl ConfigArgs {
    fn load(&self) -> Result<Config> {
        let mut config = Config::load(&self.config)
            .with_context(|| format!("Failed to load configuration from {}", self.config.display()))?;

        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }

        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[command(flatten)]
        config: ConfigArgs,
        /// Server host
        #[arg(long)]
        host: Option<String>,
        /// Server port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Load and parse every category's snapshot, then exit
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Validate configuration and exit
    ValidateConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Suricata rule book utilities
    Rulebook {
        #[command(subcommand)]
        command: RulebookCommand,
    },
}

#[derive(Subcommand)]
enum RulebookCommand {
    /// Parse a rule book directory into the suricata_rules snapshot
    Build {
        /// Directory containing .rules, .map, .txt and classification.config files
        #[arg(long)]
        rules_dir: PathBuf,
        /// Snapshot to (re)publish
        #[arg(short, long, default_value = "data/suricata_rules.json")]
        output: PathBuf,
    },
    /// Summarize the rule patterns of a rule book snapshot
    Analyze {
        #[arg(short, long, default_value = "data/suricata_rules.json")]
        input: PathBuf,
        /// Also write the summary as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not print the summary
        #[arg(short, long)]
        quiet: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => {
            let mut config = config.load()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate().context("Configuration validation failed")?;

            init_tracing(&config.logging);
            serve(config).await
        }
        Commands::Check { config } => {
            let config = config.load()?;
            init_tracing(&config.logging);
            check(&config).await
        }
        Commands::ValidateConfig { config } => {
            let config = config.load()?;
            init_tracing(&config.logging);
            config.validate().context("Configuration validation failed")?;
            print_config_summary(&config);
            info!("Configuration is valid");
            Ok(())
        }
        Commands::Rulebook { command } => {
            init_tracing(&LoggingConfig::default());
            run_rulebook(command)
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("siem_snapshot_api={level},snapshot_server={level},tower_http={level}").into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
}

async fn serve(config: Config) -> Result<()> {
    let storage = FileStorage::new(&config.storage.data_dir);
    for category in Category::ALL {
        let path = storage.path_for(category.resource_key());
        if !path.is_file() {
            warn!("Snapshot for '{}' is missing: {}", category, path.display());
        }
    }

    let service = RetrievalService::new(Arc::new(storage));
    info!("Serving snapshots from {}", service.storage().describe());

    let app = create_app(AppState::new(service), &config)?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid server host")?,
        config.server.port,
    );

    print_config_summary(&config);
    info!("Backend server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn check(config: &Config) -> Result<()> {
    let service = RetrievalService::new(Arc::new(FileStorage::new(&config.storage.data_dir)));
    let mut failed = 0;

    for category in Category::ALL {
        match service.load(category).await {
            Ok(value) => println!("ok    {:<20} {}", category.resource_key(), describe(&value)),
            Err(e) => {
                failed += 1;
                println!("FAIL  {:<20} {}", category.resource_key(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} snapshots failed to load", failed, Category::ALL.len());
    }
    Ok(())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("array, {} items", items.len()),
        Value::Object(fields) => format!("object, {} keys", fields.len()),
        _ => "scalar".to_string(),
    }
}

fn run_rulebook(command: RulebookCommand) -> Result<()> {
    match command {
        RulebookCommand::Build { rules_dir, output } => {
            let book = rulebook::build_rule_book(&rules_dir)
                .with_context(|| format!("Failed to build rule book from {}", rules_dir.display()))?;
            book.publish(&output)?;
            Ok(())
        }
        RulebookCommand::Analyze { input, output, quiet } => {
            let book = RuleBook::load(&input)?;
            let summary = book.summarize();

            if !quiet {
                print!("{}", summary.render());
            }
            if let Some(output) = output {
                rulebook::write_json_atomic(&output, &summary)?;
            }
            Ok(())
        }
    }
}

/// Print configuration summary
fn print_config_summary(config: &Config) {
    info!("=== Configuration Summary ===");
    info!("Server: {}:{}", config.server.host, config.server.port);
    info!("Data Directory: {}", config.storage.data_dir.display());
    info!("Request Timeout: {}s", config.server.request_timeout_secs);
    info!("CORS Origins: {}", config.server.cors_origins.join(", "));
    info!("Log Format: {}", config.logging.format);
    info!("================================");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
