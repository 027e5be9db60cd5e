//! Shopping cart and its single-column text encoding.
//!
//! A cart is a set of product ids. It is stored on the user row as the ids in
//! ascending numeric order separated by single spaces, with the sentinel `-1`
//! for an empty cart:
//!
//! ```text
//! -1        empty
//! 5         one product
//! 3 5 12    three products
//! ```
//!
//! Reading is lenient: any whitespace separates ids, duplicates collapse, and
//! negative ids (the sentinel included) are ignored. Writing is canonical.

use std::collections::BTreeSet;
use std::fmt;

use crate::ProductId;
use crate::types::EMPTY_SENTINEL;

/// Errors from decoding or mutating a [`Cart`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The stored text contains something that is not an integer.
    #[error("invalid product id {0:?} in cart")]
    InvalidToken(String),
    /// The product is already in the cart.
    #[error("product {0} is already in the cart")]
    AlreadyInCart(ProductId),
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// A set of product ids a user intends to buy, kept in ascending order.
///
/// ```
/// use bazaar_core::{Cart, ProductId};
///
/// let mut cart = Cart::decode("-1").unwrap();
/// cart.add(ProductId::new(5)).unwrap();
/// assert_eq!(cart.encode(), "5");
/// cart.add(ProductId::new(3)).unwrap();
/// assert_eq!(cart.encode(), "3 5");
/// cart.remove(ProductId::new(5)).unwrap();
/// assert_eq!(cart.encode(), "3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: BTreeSet<ProductId>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: BTreeSet::new(),
        }
    }

    /// Decode the stored text form.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidToken`] if a whitespace-separated token is
    /// not an integer.
    pub fn decode(text: &str) -> Result<Self, CartError> {
        let mut items = BTreeSet::new();
        for token in text.split_whitespace() {
            let id: i64 = token
                .parse()
                .map_err(|_| CartError::InvalidToken(token.to_owned()))?;
            if id >= 0 {
                items.insert(ProductId::new(id));
            }
        }
        Ok(Self { items })
    }

    /// Encode to the canonical stored text form.
    #[must_use]
    pub fn encode(&self) -> String {
        if self.items.is_empty() {
            return EMPTY_SENTINEL.to_owned();
        }
        self.items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AlreadyInCart`] if the product is present.
    pub fn add(&mut self, product_id: ProductId) -> Result<(), CartError> {
        if self.items.insert(product_id) {
            Ok(())
        } else {
            Err(CartError::AlreadyInCart(product_id))
        }
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product is absent.
    pub fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        if self.items.remove(&product_id) {
            Ok(())
        } else {
            Err(CartError::NotInCart(product_id))
        }
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.contains(&product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Product ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.items.iter().copied()
    }
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromIterator<ProductId> for Cart {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
