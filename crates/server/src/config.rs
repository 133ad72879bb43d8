//! Server configuration.
//!
//! Provides configuration loading from files and environment variables,
//! plus the command-line surface that overrides both.

use std::net::SocketAddr;

use clap::Parser;
use serde::Deserialize;

/// Command-line arguments.
///
/// Every flag overrides the corresponding config-file/environment value.
#[derive(Debug, Parser)]
#[command(name = "roster-server", about = "gRPC CRUD server for users and posts", version)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    pub config_file: Option<String>,

    /// Address to listen on for gRPC (e.g. "0.0.0.0:50051").
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// SQLite connection string (e.g. "sqlite://roster.db").
    #[arg(long)]
    pub database_url: Option<String>,

    /// Log output format.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (development).
    Text,
    /// JSON structured logging (production).
    Json,
    /// JSON for non-TTY stdout, text otherwise.
    Auto,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address to listen on for gRPC.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// SQLite connection string.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            database_url: default_database_url(),
            log_format: default_log_format(),
        }
    }
}

#[allow(clippy::unwrap_used)]
fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:50051".parse().unwrap()
}

fn default_database_url() -> String {
    "sqlite://roster.db".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Auto
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Supports TOML format. Environment variables override config values
    /// using the `ROSTER` prefix with `__` as the nesting separator
    /// (e.g. `ROSTER__LISTEN_ADDR=0.0.0.0:50051`).
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let builder = config::Config::builder();

        // Add config file if provided
        let builder = if let Some(path) = path {
            builder.add_source(config::File::with_name(path))
        } else {
            // Try default locations
            builder
                .add_source(config::File::with_name("roster").required(false))
                .add_source(config::File::with_name("/etc/roster/config").required(false))
        };

        let builder = builder.add_source(
            config::Environment::with_prefix("ROSTER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides on top of file/environment values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = cli.listen {
            self.listen_addr = listen;
        }
        if let Some(ref database_url) = cli.database_url {
            self.database_url = database_url.clone();
        }
        if let Some(log_format) = cli.log_format {
            self.log_format = log_format;
        }
    }

    /// Whether the server only accepts local connections.
    pub fn is_localhost_only(&self) -> bool {
        self.listen_addr.ip().is_loopback()
    }

    /// Whether the store lives in memory and vanishes on shutdown.
    pub fn is_ephemeral(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration.
    Load(String),
    /// Failed to parse configuration.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "failed to load config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
