//! Database migration command.
//!
//! Applies the storefront migrations embedded in the binary
//! (`crates/storefront/migrations/`). Already applied migrations are skipped.

use bazaar_storefront::db::MIGRATOR;
use sqlx::SqlitePool;

use super::CommandError;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the applied history doesn't
/// match the embedded migrations.
pub async fn run(pool: &SqlitePool) -> Result<(), CommandError> {
    tracing::info!(
        available = MIGRATOR.iter().count(),
        "Running storefront migrations..."
    );
    MIGRATOR.run(pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}
