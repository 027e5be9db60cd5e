//! Authentication service.
//!
//! Provides password registration and login. Passwords are stored as Argon2id
//! PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use bazaar_core::{Email, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Input collected by the registration form.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_again: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` if the two passwords differ.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidUsername` if the username is blank or too long.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        if form.password != form.password_again {
            return Err(AuthError::PasswordMismatch);
        }

        let email = Email::parse(form.email)?;
        let username = Username::parse(form.username)?;
        validate_password(form.password)?;

        let password_hash = hash_password(form.password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong,
    /// including when the e-mail is malformed.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    const PASSWORD: &str = "correct horse";

    fn registration<'a>(email: &'a str, password_again: &'a str) -> Registration<'a> {
        Registration {
            username: "Olga",
            email,
            password: PASSWORD,
            password_again,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);

        let user = auth
            .register(registration("olga@example.com", PASSWORD))
            .await
            .unwrap();
        assert_eq!(user.username.as_str(), "Olga");

        let logged_in = auth.login("OLGA@example.com", PASSWORD).await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        auth.register(registration("olga@example.com", PASSWORD))
            .await
            .unwrap();

        for (email, password) in [
            ("olga@example.com", "wrong password"),
            ("nobody@example.com", PASSWORD),
            ("not an email", PASSWORD),
        ] {
            let err = auth.login(email, password).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{email}");
        }
    }

    #[tokio::test]
    async fn test_register_validation() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);

        let err = auth
            .register(registration("olga@example.com", "something else"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
        assert!(err.is_user_error());

        let err = auth
            .register(Registration {
                password: "short",
                password_again: "short",
                ..registration("olga@example.com", PASSWORD)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));

        let err = auth
            .register(registration("olga", PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let pool = create_memory_pool().await.unwrap();
        let auth = AuthService::new(&pool);
        auth.register(registration("olga@example.com", PASSWORD))
            .await
            .unwrap();

        let err = auth
            .register(registration("Olga@Example.com", PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(err.to_string(), "A user with this e-mail already exists");
    }

    #[test]
    fn test_hash_verifies() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret-pass", &hash).is_ok());
        assert!(verify_password("other", &hash).is_err());
    }
}
