//! Database operations for the marketplace SQLite database.
//!
//! ## Tables
//!
//! - `users` - Accounts, with the cart and notification queue as encoded text
//! - `products` - Listings currently for sale
//! - `tower_sessions` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded in
//! [`MIGRATOR`], and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod checkout;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use bazaar_core::{CartError, NotificationError};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Rejected cart mutation.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Rejected notification append.
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// The database file is created if it does not exist. Foreign keys are
/// enforced and the write-ahead log is enabled.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &SecretString,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a migrated, private in-memory database.
///
/// Every connection to `sqlite::memory:` opens a fresh database, so the pool
/// holds exactly one connection and never recycles it.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database cannot be opened or migrated.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

/// Open a transaction that holds the write lock from its first statement.
///
/// A plain `BEGIN` is deferred: two overlapping read-modify-write
/// transactions both take a read snapshot, and the second one to upgrade
/// fails with `SQLITE_BUSY` without waiting. `BEGIN IMMEDIATE` takes the
/// lock up front, so concurrent writers queue on the busy timeout instead.
pub(crate) async fn begin_write(
    pool: &SqlitePool,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
