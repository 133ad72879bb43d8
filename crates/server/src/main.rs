//! Roster server binary.
//!
//! Launches the gRPC user and post services over a SQLite record store.
//!
//! # Usage
//!
//! ```bash
//! # Start with an on-disk store
//! roster-server --listen 0.0.0.0:50051 --database-url sqlite://roster.db
//!
//! # Start with environment variables
//! ROSTER__LISTEN_ADDR=0.0.0.0:50051 \
//! ROSTER__DATABASE_URL=sqlite://roster.db \
//! roster-server
//!
//! # CLI arguments override environment variables
//! ROSTER__DATABASE_URL=sqlite://other.db roster-server --database-url sqlite::memory:
//! ```

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;
use roster_server::config::{Cli, Config, ConfigError, LogFormat};
use roster_server::server::RosterServer;
use roster_server::shutdown;
use roster_storage::{SqlitePostRepository, SqliteUserRepository, StorageError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Top-level error type for the server binary, wrapping startup and runtime failures.
#[derive(Debug)]
enum ServerError {
    Config(ConfigError),
    Storage(StorageError),
    Server(Box<dyn std::error::Error>),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "config error: {}", e),
            ServerError::Storage(e) => write!(f, "storage error: {}", e),
            ServerError::Server(e) => write!(f, "server error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Parse CLI args (clap handles --help and --version)
    let cli = Cli::parse();

    let mut config = Config::load(cli.config_file.as_deref()).map_err(ServerError::Config)?;
    config.apply_cli(&cli);

    // Initialize logging based on config
    init_logging(&config);

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_url = %config.database_url,
        "Starting Roster"
    );

    // Warn if listening only on localhost
    if config.is_localhost_only() {
        tracing::warn!(
            "Listening on localhost only. Remote connections will be rejected. \
             Set --listen or ROSTER__LISTEN_ADDR to accept remote connections."
        );
    }

    // Warn if running against an in-memory store
    if config.is_ephemeral() {
        tracing::warn!(
            "Running with an in-memory store. All data will be lost on shutdown. \
             Set --database-url or ROSTER__DATABASE_URL for persistent storage."
        );
    }

    let pool = roster_storage::create_pool(&config.database_url)
        .await
        .map_err(ServerError::Storage)?;
    roster_storage::run_migrations(&pool)
        .await
        .map_err(ServerError::Storage)?;

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let posts = Arc::new(SqlitePostRepository::new(pool));
    let server = RosterServer::new(config.listen_addr, users, posts);

    tracing::info!("Server ready, accepting connections");
    server
        .serve_with_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(ServerError::Server)?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the logging system based on configuration.
///
/// Supports three formats:
/// - `Text`: Human-readable format (development)
/// - `Json`: JSON structured logging (production)
/// - `Auto`: JSON for non-TTY stdout, text otherwise
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match config.log_format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !std::io::stdout().is_terminal(),
    };

    if use_json {
        // JSON format for production / log aggregation
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        // Human-readable text format for development
        tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init();
    }
}
