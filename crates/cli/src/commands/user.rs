//! Account management commands.

use bazaar_storefront::services::auth::{AuthService, Registration};
use sqlx::SqlitePool;

use super::CommandError;

/// Create an account with the same rules as the registration form.
///
/// # Errors
///
/// Returns an error if the input is invalid or the e-mail is taken.
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), CommandError> {
    let user = AuthService::new(pool)
        .register(Registration {
            username,
            email,
            password,
            password_again: password,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "User created");
    Ok(())
}
