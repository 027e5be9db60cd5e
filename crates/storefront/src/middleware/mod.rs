//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, per-request hub)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (record on the span, echo back)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `SQLite` store)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, remember_session};
