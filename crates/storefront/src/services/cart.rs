//! Cart changes and checkout.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use bazaar_core::{Cart, Price, ProductId, UserId};

use super::ServiceError;
use super::photos::PhotoStore;
use crate::db::checkout::checkout;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::models::Product;

/// The products currently in a cart.
#[derive(Debug)]
pub struct CartContents {
    /// Products still listed, ascending by id.
    pub products: Vec<Product>,
    /// Sum of their prices.
    pub total: Decimal,
}

/// Cart operations for one request.
pub struct CartService<'a> {
    pool: &'a SqlitePool,
    photos: &'a PhotoStore,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, photos: &'a PhotoStore) -> Self {
        Self { pool, photos }
    }

    /// Put a product in the user's cart.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the product doesn't exist
    /// - `ServiceError::OwnProduct` if the user is the seller
    /// - `ServiceError::Cart` if it is already in the cart
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<Product, ServiceError> {
        let product = ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if product.is_owned_by(user_id) {
            return Err(ServiceError::OwnProduct);
        }

        UserRepository::new(self.pool)
            .add_to_cart(user_id, product_id)
            .await?;

        tracing::debug!(%user_id, %product_id, "added to cart");
        Ok(product)
    }

    /// Take a product out of the user's cart.
    ///
    /// An id in the cart is removed even if its product is gone, so stale
    /// entries can always be cleared.
    ///
    /// # Errors
    ///
    /// For an id not in the cart: `ServiceError::NotFound` if no such product
    /// exists, `ServiceError::Cart` otherwise.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), ServiceError> {
        let users = UserRepository::new(self.pool);
        let user = users.get_by_id(user_id).await?.ok_or(ServiceError::NotFound)?;

        if !user.cart.contains(product_id) {
            let exists = ProductRepository::new(self.pool)
                .get(product_id)
                .await?
                .is_some();
            return Err(if exists {
                ServiceError::Cart(bazaar_core::CartError::NotInCart(product_id))
            } else {
                ServiceError::NotFound
            });
        }

        users.remove_from_cart(user_id, product_id).await?;
        tracing::debug!(%user_id, %product_id, "removed from cart");
        Ok(())
    }

    /// The listed products in `cart` and their total.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the query fails.
    pub async fn contents(&self, cart: &Cart) -> Result<CartContents, ServiceError> {
        let products = ProductRepository::new(self.pool)
            .get_many(cart.iter())
            .await?;
        let total = Price::total(products.iter().map(|p| &p.price));
        Ok(CartContents { products, total })
    }

    /// Buy everything in the user's cart and delete the bought products'
    /// photos.
    ///
    /// # Errors
    ///
    /// Returns an error if the purchase transaction fails; nothing is bought
    /// in that case.
    pub async fn checkout(&self, user_id: UserId) -> Result<Vec<Product>, ServiceError> {
        let bought = checkout(self.pool, user_id).await?;

        for product in &bought {
            self.photos.remove_or_warn(&product.photo).await;
        }

        tracing::info!(buyer_id = %user_id, count = bought.len(), "checkout completed");
        Ok(bought)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{CartError, Email, Username};

    use super::*;
    use crate::db::create_memory_pool;
    use crate::models::{NewProduct, User};

    struct Fixture {
        pool: SqlitePool,
        photos: PhotoStore,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self {
                pool: create_memory_pool().await.unwrap(),
                photos: PhotoStore::new(dir.path()),
                _dir: dir,
            }
        }

        fn service(&self) -> CartService<'_> {
            CartService::new(&self.pool, &self.photos)
        }

        async fn user(&self, name: &str) -> User {
            UserRepository::new(&self.pool)
                .create(
                    &Username::parse(name).unwrap(),
                    &Email::parse(&format!("{name}@example.com")).unwrap(),
                    "hash",
                )
                .await
                .unwrap()
        }

        async fn product(&self, owner: &User, name: &str, price: &str) -> Product {
            let photo = self.photos.save("p.png", b"png").await.unwrap();
            ProductRepository::new(&self.pool)
                .create(&NewProduct {
                    name: name.to_owned(),
                    price: Price::parse(price).unwrap(),
                    owner_id: owner.id,
                    photo,
                })
                .await
                .unwrap()
        }

        async fn cart(&self, user: &User) -> Cart {
            UserRepository::new(&self.pool)
                .get_by_id(user.id)
                .await
                .unwrap()
                .unwrap()
                .cart
        }
    }

    #[tokio::test]
    async fn test_add_rules() {
        let f = Fixture::new().await;
        let seller = f.user("seller").await;
        let buyer = f.user("buyer").await;
        let lamp = f.product(&seller, "Lamp", "3").await;

        assert!(matches!(
            f.service().add(buyer.id, ProductId::new(99)).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            f.service().add(seller.id, lamp.id).await,
            Err(ServiceError::OwnProduct)
        ));

        f.service().add(buyer.id, lamp.id).await.unwrap();
        assert!(matches!(
            f.service().add(buyer.id, lamp.id).await,
            Err(ServiceError::Cart(CartError::AlreadyInCart(_)))
        ));
        assert!(f.cart(&buyer).await.contains(lamp.id));
    }

    #[tokio::test]
    async fn test_remove_rules() {
        let f = Fixture::new().await;
        let seller = f.user("seller").await;
        let buyer = f.user("buyer").await;
        let lamp = f.product(&seller, "Lamp", "3").await;

        assert!(matches!(
            f.service().remove(buyer.id, lamp.id).await,
            Err(ServiceError::Cart(CartError::NotInCart(_)))
        ));
        assert!(matches!(
            f.service().remove(buyer.id, ProductId::new(99)).await,
            Err(ServiceError::NotFound)
        ));

        f.service().add(buyer.id, lamp.id).await.unwrap();
        f.service().remove(buyer.id, lamp.id).await.unwrap();
        assert!(f.cart(&buyer).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_stale_entry() {
        let f = Fixture::new().await;
        let seller = f.user("seller").await;
        let buyer = f.user("buyer").await;
        let lamp = f.product(&seller, "Lamp", "3").await;

        f.service().add(buyer.id, lamp.id).await.unwrap();
        ProductRepository::new(&f.pool).delete(lamp.id).await.unwrap();

        f.service().remove(buyer.id, lamp.id).await.unwrap();
        assert!(f.cart(&buyer).await.is_empty());
    }

    #[tokio::test]
    async fn test_contents_and_checkout() {
        let f = Fixture::new().await;
        let seller = f.user("seller").await;
        let buyer = f.user("buyer").await;
        let lamp = f.product(&seller, "Lamp", "3.50").await;
        let rug = f.product(&seller, "Rug", "10").await;

        f.service().add(buyer.id, rug.id).await.unwrap();
        f.service().add(buyer.id, lamp.id).await.unwrap();

        let contents = f.service().contents(&f.cart(&buyer).await).await.unwrap();
        assert_eq!(contents.products.len(), 2);
        assert_eq!(contents.total.to_string(), "13.50");

        let bought = f.service().checkout(buyer.id).await.unwrap();
        assert_eq!(bought.len(), 2);
        for product in &bought {
            assert!(!f.photos.dir().join(&product.photo).exists());
        }

        let notes = UserRepository::new(&f.pool)
            .take_notifications(seller.id)
            .await
            .unwrap();
        assert_eq!(notes, ["Lamp", "Rug"]);
    }
}
