//! SQLite persistence layer for Roster.
//!
//! Provides the `users` and `posts` table schemas (via embedded migrations),
//! pool construction, and the [`UserRepository`] / [`PostRepository`]
//! abstractions the gRPC services are written against.
//!
//! # Example
//!
//! ```rust,no_run
//! use roster_storage::{create_pool, run_migrations, SqliteUserRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://roster.db").await?;
//! run_migrations(&pool).await?;
//! let repository = SqliteUserRepository::new(pool);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod error;
mod posts;
mod users;

pub use error::{Result, StorageError};
pub use posts::{Post, PostRepository, SqlitePostRepository};
pub use users::{SqliteUserRepository, User, UserRepository};

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

// Embed migrations into the binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Runs database migrations.
///
/// Called once at startup to ensure the `users` table exists with its
/// primary-key and unique-email constraints, and the `posts` table with its
/// primary key.
///
/// # Errors
///
/// Returns an error if migrations fail to apply.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Creates a `SQLite` connection pool.
///
/// The database file is created if missing. WAL journal mode is enabled so
/// concurrent request handlers don't serialize on the writer lock more than
/// SQLite requires.
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the connection
/// fails.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates a single-connection in-memory pool.
///
/// Capped at one connection because every new connection to
/// `sqlite::memory:` opens a fresh, empty database. Used by tests and
/// ephemeral deployments.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    Ok(pool)
}
