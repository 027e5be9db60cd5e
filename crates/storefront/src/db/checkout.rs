//! Purchase of a user's whole cart.
//!
//! Buying a product removes the listing and queues a notification (the
//! product name) for its seller. All row changes for one checkout happen in a
//! single transaction; deleting the photo files is left to the caller once
//! the transaction has committed.

use sqlx::SqlitePool;

use bazaar_core::UserId;

use super::{RepositoryError, begin_write};
use super::products::{delete_product, fetch_product};
use super::users::{clear_cart, load_cart, push_notification};
use crate::models::Product;

/// Buy every product in `buyer_id`'s cart.
///
/// Products are processed in ascending id order, so a seller with several
/// items in the cart receives their notifications in that order. Ids whose
/// product no longer exists (deleted or bought by someone else) are skipped.
/// The cart is empty afterwards.
///
/// Returns the products that were bought.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the buyer doesn't exist, or a
/// database error; in either case nothing is changed.
pub async fn checkout(pool: &SqlitePool, buyer_id: UserId) -> Result<Vec<Product>, RepositoryError> {
    let mut tx = begin_write(pool).await?;
    let cart = load_cart(&mut tx, buyer_id).await?;

    let mut bought = Vec::with_capacity(cart.len());
    for product_id in cart.iter() {
        let Some(product) = fetch_product(&mut tx, product_id).await? else {
            tracing::debug!(%product_id, "skipping product no longer listed");
            continue;
        };

        if product.is_owned_by(buyer_id) {
            tracing::warn!(%product_id, %buyer_id, "own product found in cart, skipping");
            continue;
        }

        push_notification(&mut tx, product.owner_id, &product.name).await?;
        delete_product(&mut tx, product.id).await?;
        bought.push(product);
    }

    clear_cart(&mut tx, buyer_id).await?;
    tx.commit().await?;

    Ok(bought)
}
