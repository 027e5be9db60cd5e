//! Demo data for local development.

use bazaar_storefront::db::MIGRATOR;
use bazaar_storefront::services::auth::{AuthError, AuthService, Registration};
use sqlx::SqlitePool;

use super::CommandError;

/// Demo accounts as (username, e-mail). Both use [`DEMO_PASSWORD`].
const DEMO_USERS: [(&str, &str); 2] = [
    ("Alice", "alice@example.com"),
    ("Bob", "bob@example.com"),
];

const DEMO_PASSWORD: &str = "bazaar-demo";

/// Apply migrations, then create the demo accounts that don't exist yet.
///
/// # Errors
///
/// Returns an error if migrations or account creation fail.
pub async fn run(pool: &SqlitePool) -> Result<(), CommandError> {
    MIGRATOR.run(pool).await?;

    let auth = AuthService::new(pool);
    for (username, email) in DEMO_USERS {
        let registration = Registration {
            username,
            email,
            password: DEMO_PASSWORD,
            password_again: DEMO_PASSWORD,
        };

        match auth.register(registration).await {
            Ok(user) => tracing::info!(user_id = %user.id, %email, "Demo user created"),
            Err(AuthError::UserAlreadyExists) => {
                tracing::info!(%email, "Demo user already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(password = DEMO_PASSWORD, "Seeding complete");
    Ok(())
}
