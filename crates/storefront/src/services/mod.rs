//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `cart` - Cart changes and checkout
//! - `listings` - Creating, editing, and deleting products
//! - `photos` - Product photo files
//! - `search` - Name search over users and products

pub mod auth;
pub mod cart;
pub mod listings;
pub mod photos;
pub mod search;

use thiserror::Error;

use bazaar_core::CartError;

use crate::db::RepositoryError;
use photos::PhotoError;

/// Errors shared by the cart and listing services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The product (or user) does not exist.
    #[error("not found")]
    NotFound,

    /// The product belongs to someone else.
    #[error("you do not own this product")]
    Forbidden,

    /// A user tried to put their own product in their cart.
    #[error("you cannot buy your own product")]
    OwnProduct,

    /// The cart change doesn't apply to the current cart.
    #[error(transparent)]
    Cart(CartError),

    /// Form input that failed validation.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Photo(#[from] PhotoError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl ServiceError {
    /// Whether the message should be shown on a re-rendered form.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::Invalid(_) => true,
            Self::Photo(e) => e.is_user_error(),
            _ => false,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Cart(e) => Self::Cart(e),
            other => Self::Repository(other),
        }
    }
}
