//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// The `Display` text of the validation variants is shown to the user when a
/// form is re-rendered.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("Invalid e-mail address: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] bazaar_core::UsernameError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Incorrect e-mail or password")]
    InvalidCredentials,

    /// User already exists.
    #[error("A user with this e-mail already exists")]
    UserAlreadyExists,

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the error is the user's to fix (re-render the form) rather
    /// than a server failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
