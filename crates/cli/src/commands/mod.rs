//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use bazaar_storefront::config::{ConfigError, StorefrontConfig};
use bazaar_storefront::db;
use bazaar_storefront::services::auth::AuthError;
use sqlx::SqlitePool;

/// Errors from any subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Open the configured database.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the database cannot
/// be opened.
pub async fn connect() -> Result<SqlitePool, CommandError> {
    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::debug!("Connected to database");
    Ok(pool)
}
