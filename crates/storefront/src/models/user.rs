//! User domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{Cart, Email, UserId, Username};

/// A marketplace account (domain type).
///
/// The password hash and the notification queue are deliberately absent:
/// they are only read through dedicated repository calls.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: Username,
    /// Login e-mail, unique across accounts.
    pub email: Email,
    /// Products the user intends to buy.
    pub cart: Cart,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
