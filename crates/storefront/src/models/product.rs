//! Product listing domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{Price, ProductId, UserId};

/// A listing currently for sale.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// The seller.
    pub owner_id: UserId,
    /// File name of the photo inside the upload directory.
    pub photo: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Data for a listing about to be inserted.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub owner_id: UserId,
    pub photo: String,
}
