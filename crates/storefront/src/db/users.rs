//! User repository for database operations.
//!
//! Besides plain account lookups this owns the two encoded text columns on
//! the user row. Every cart or notification change is a read-modify-write of
//! a single row inside one transaction, with the structure imposed by the
//! `bazaar_core` codecs.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use bazaar_core::{Cart, Email, EMPTY_SENTINEL, ProductId, UserId, Username};
use bazaar_core::notifications::{append_notification, drain_notifications};

use super::{RepositoryError, begin_write, conflict_on_unique};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, shopcart, created_at";

/// Row type for `users`, decoded into [`User`].
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    shopcart: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&r.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let cart = decode_cart(&r.shopcart)?;

        Ok(Self {
            id: UserId::new(r.id),
            username,
            email,
            cart,
            created_at: r.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their e-mail address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user together with their password hash, by e-mail.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_one(self.pool)
            .await?;

        Ok(Some((user, hash)))
    }

    /// Create a new user with an empty cart and notification queue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username.as_str())
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        User::try_from(row)
    }

    /// List every user, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Add a product to a user's cart and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Cart` if the product is already in the cart.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Cart, RepositoryError> {
        let mut tx = begin_write(self.pool).await?;
        let mut cart = load_cart(&mut tx, user_id).await?;
        cart.add(product_id)?;
        store_cart(&mut tx, user_id, &cart).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Remove a product from a user's cart and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Cart` if the product is not in the cart.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Cart, RepositoryError> {
        let mut tx = begin_write(self.pool).await?;
        let mut cart = load_cart(&mut tx, user_id).await?;
        cart.remove(product_id)?;
        store_cart(&mut tx, user_id, &cart).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Read and clear a user's pending notifications.
    ///
    /// Messages are returned in the order they were queued. Once this returns
    /// the queue is empty in the database; there is no redelivery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn take_notifications(&self, user_id: UserId) -> Result<Vec<String>, RepositoryError> {
        let mut tx = begin_write(self.pool).await?;

        let text: String = sqlx::query_scalar("SELECT notifications FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let (messages, reset) = drain_notifications(&text);
        if !messages.is_empty() {
            sqlx::query("UPDATE users SET notifications = ? WHERE id = ?")
                .bind(reset)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(messages)
    }
}

// =============================================================================
// Transaction helpers (shared with checkout)
// =============================================================================

fn decode_cart(text: &str) -> Result<Cart, RepositoryError> {
    Cart::decode(text)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid cart in database: {e}")))
}

/// Load a user's cart on an open connection.
pub(super) async fn load_cart(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Cart, RepositoryError> {
    let text: String = sqlx::query_scalar("SELECT shopcart FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    decode_cart(&text)
}

/// Persist a user's cart on an open connection.
pub(super) async fn store_cart(
    conn: &mut SqliteConnection,
    user_id: UserId,
    cart: &Cart,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE users SET shopcart = ? WHERE id = ?")
        .bind(cart.encode())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Reset a user's cart to the empty sentinel on an open connection.
pub(super) async fn clear_cart(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE users SET shopcart = ? WHERE id = ?")
        .bind(EMPTY_SENTINEL)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Queue a notification for a user on an open connection.
pub(super) async fn push_notification(
    conn: &mut SqliteConnection,
    user_id: UserId,
    message: &str,
) -> Result<(), RepositoryError> {
    let text: String = sqlx::query_scalar("SELECT notifications FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let updated = append_notification(&text, message)?;

    sqlx::query("UPDATE users SET notifications = ? WHERE id = ?")
        .bind(updated)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
