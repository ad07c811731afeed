//! Main entry point for the Ranked Arena matchmaking engine
//!
//! Runs the engine standalone with the in-process chat adapter. A real
//! deployment replaces that adapter with a gateway bridge to the chat
//! platform; everything below the adapter is identical in both setups.

use anyhow::Result;
use clap::Parser;
use ranked_arena::chat::{InMemoryRoleProvider, InProcessMessenger};
use ranked_arena::config::AppConfig;
use ranked_arena::service::ArenaService;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Ranked Arena - community matchmaking and Elo ranking engine
#[derive(Parser)]
#[command(
    name = "ranked-arena",
    version,
    about = "Matchmaking ping board, Elo ladder, and match confirmation engine",
    long_about = "Ranked Arena keeps short-lived matchmaking pings per queue, runs a classic \
                 Elo ladder, verifies reported matches with a two-party acknowledgement \
                 handshake, and assigns tier badges from rating bands."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting the engine"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with engine configuration
fn display_startup_banner(config: &AppConfig) {
    info!("Ranked Arena Matchmaking Engine");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Ping visibility: {}m",
        config.pings.visibility_minutes
    );
    info!(
        "   Arena channels: {}",
        config.ranked.arena_channels.len()
    );
    info!(
        "   Acknowledgement timeout: {}s",
        config.ranked.ack_timeout_seconds
    );
    info!("   Elo K-factor: {}", config.rating.k_factor);
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    ranked_arena::config::validate_config(&config)?;

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting the engine");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing engine components...");
    let messenger = Arc::new(InProcessMessenger::new());
    let roles = Arc::new(InMemoryRoleProvider::new());
    let shutdown_timeout = config.shutdown_timeout();
    let service = Arc::new(ArenaService::new(config, messenger, roles)?);

    // Background expiry sweep over the ping buckets
    let sweeper_task = {
        let service = service.clone();
        tokio::spawn(async move {
            service.run_sweeper().await;
        })
    };

    info!("Ranked Arena engine is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    wait_for_shutdown_signal().await;

    info!("Shutdown signal received, beginning graceful shutdown...");

    sweeper_task.abort();

    // Give in-flight confirmation handshakes a moment to resolve
    let shutdown_future = sleep(Duration::from_millis(100));
    match tokio::time::timeout(shutdown_timeout, shutdown_future).await {
        Ok(()) => {
            info!("Graceful shutdown completed successfully");
        }
        Err(_) => {
            warn!("Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("Ranked Arena engine stopped");
    Ok(())
}
