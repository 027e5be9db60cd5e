//! Session middleware configuration.
//!
//! Sessions are stored in the `tower_sessions` table of the marketplace
//! database. By default the cookie lasts until the browser closes; "remember
//! me" switches a session to a sliding expiry.

use sqlx::SqlitePool;
use tower_sessions::cookie::{SameSite, time::Duration};
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bazaar_session";

/// Inactivity window for remembered sessions.
pub const REMEMBER_ME_DAYS: i64 = 10;

/// Create the session layer backed by `SQLite`.
///
/// The `tower_sessions` table is created by the storefront migrations.
#[must_use]
pub fn create_session_layer(
    pool: &SqlitePool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<SqliteStore> {
    let store = SqliteStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Keep this session alive across browser restarts until it has been idle
/// for [`REMEMBER_ME_DAYS`].
pub fn remember_session(session: &Session) {
    session.set_expiry(Some(Expiry::OnInactivity(Duration::days(REMEMBER_ME_DAYS))));
}
