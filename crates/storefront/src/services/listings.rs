//! Creating, editing, and deleting product listings.

use sqlx::SqlitePool;

use bazaar_core::{Price, ProductId, UserId};

use super::ServiceError;
use super::photos::PhotoStore;
use crate::db::products::ProductRepository;
use crate::models::{NewProduct, Product};

/// Longest accepted product name, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Validated name and price from a listing form.
#[derive(Debug, Clone)]
pub struct ListingDetails {
    pub name: String,
    pub price: Price,
}

impl ListingDetails {
    /// Validate raw form fields.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` with a user-facing message.
    pub fn parse(name: &str, price: &str) -> Result<Self, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Name is required".to_owned()));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(ServiceError::Invalid(format!(
                "Name must be at most {MAX_NAME_CHARS} characters"
            )));
        }

        let price = Price::parse(price).map_err(|e| ServiceError::Invalid(capitalize(&e.to_string())))?;

        Ok(Self {
            name: name.to_owned(),
            price,
        })
    }
}

/// An uploaded photo as received from the form.
#[derive(Debug, Clone, Copy)]
pub struct PhotoUpload<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

/// Listing operations for one request.
pub struct ListingService<'a> {
    pool: &'a SqlitePool,
    photos: &'a PhotoStore,
}

impl<'a> ListingService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, photos: &'a PhotoStore) -> Self {
        Self { pool, photos }
    }

    /// Put a new product up for sale.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Photo` for a rejected upload, or
    /// `ServiceError::Repository` if the insert fails. No photo is left
    /// behind on failure.
    pub async fn create(
        &self,
        owner_id: UserId,
        details: ListingDetails,
        photo: PhotoUpload<'_>,
    ) -> Result<Product, ServiceError> {
        let photo = self.photos.save(photo.file_name, photo.bytes).await?;

        let created = ProductRepository::new(self.pool)
            .create(&NewProduct {
                name: details.name,
                price: details.price,
                owner_id,
                photo: photo.clone(),
            })
            .await;

        match created {
            Ok(product) => {
                tracing::info!(product_id = %product.id, %owner_id, "product listed");
                Ok(product)
            }
            Err(e) => {
                self.photos.remove_or_warn(&photo).await;
                Err(e.into())
            }
        }
    }

    /// Fetch a product the user is allowed to change.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if it doesn't exist, or
    /// `ServiceError::Forbidden` if someone else is the seller.
    pub async fn owned(&self, id: ProductId, user_id: UserId) -> Result<Product, ServiceError> {
        let product = ProductRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if !product.is_owned_by(user_id) {
            tracing::warn!(product_id = %id, %user_id, "attempt to change another user's product");
            return Err(ServiceError::Forbidden);
        }
        Ok(product)
    }

    /// Change the name and price of one of the user's products.
    ///
    /// # Errors
    ///
    /// Same as [`Self::owned`], plus repository failures.
    pub async fn update(
        &self,
        id: ProductId,
        user_id: UserId,
        details: ListingDetails,
    ) -> Result<Product, ServiceError> {
        self.owned(id, user_id).await?;
        let product = ProductRepository::new(self.pool)
            .update(id, &details.name, details.price)
            .await?;
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Withdraw one of the user's products and delete its photo.
    ///
    /// # Errors
    ///
    /// Same as [`Self::owned`], plus repository failures. Photo removal
    /// failures are only logged.
    pub async fn delete(&self, id: ProductId, user_id: UserId) -> Result<(), ServiceError> {
        let product = self.owned(id, user_id).await?;

        if !ProductRepository::new(self.pool).delete(id).await? {
            return Err(ServiceError::NotFound);
        }
        self.photos.remove_or_warn(&product.photo).await;

        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Email, Username};

    use super::*;
    use crate::db::create_memory_pool;
    use crate::db::users::UserRepository;

    async fn user(pool: &SqlitePool, name: &str) -> UserId {
        UserRepository::new(pool)
            .create(
                &Username::parse(name).unwrap(),
                &Email::parse(&format!("{name}@example.com")).unwrap(),
                "hash",
            )
            .await
            .unwrap()
            .id
    }

    const UPLOAD: PhotoUpload<'static> = PhotoUpload {
        file_name: "lamp.png",
        bytes: b"\x89PNG",
    };

    #[test]
    fn test_details_validation() {
        let details = ListingDetails::parse("  Lamp ", "4,5").unwrap();
        assert_eq!(details.name, "Lamp");
        assert_eq!(details.price.to_string(), "4.50");

        let err = ListingDetails::parse("", "4").unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
        assert!(err.is_user_error());

        let err = ListingDetails::parse("Lamp", "free").unwrap_err();
        assert_eq!(err.to_string(), "Price must be a number");

        let long = "x".repeat(MAX_NAME_CHARS + 1);
        assert!(ListingDetails::parse(&long, "1").is_err());
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_memory_pool().await.unwrap();
        let photos = PhotoStore::new(dir.path());
        let service = ListingService::new(&pool, &photos);
        let owner = user(&pool, "owner").await;

        let product = service
            .create(owner, ListingDetails::parse("Lamp", "4").unwrap(), UPLOAD)
            .await
            .unwrap();
        assert!(dir.path().join(&product.photo).exists());

        let updated = service
            .update(product.id, owner, ListingDetails::parse("Floor lamp", "6").unwrap())
            .await
            .unwrap();
        assert_eq!(updated.name, "Floor lamp");

        service.delete(product.id, owner).await.unwrap();
        assert!(!dir.path().join(&product.photo).exists());
        assert!(matches!(
            service.delete(product.id, owner).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_only_owner_may_change() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_memory_pool().await.unwrap();
        let photos = PhotoStore::new(dir.path());
        let service = ListingService::new(&pool, &photos);
        let owner = user(&pool, "owner").await;
        let other = user(&pool, "other").await;

        let product = service
            .create(owner, ListingDetails::parse("Lamp", "4").unwrap(), UPLOAD)
            .await
            .unwrap();

        assert!(matches!(
            service
                .update(product.id, other, ListingDetails::parse("Mine", "1").unwrap())
                .await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            service.delete(product.id, other).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(dir.path().join(&product.photo).exists());
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_photo() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_memory_pool().await.unwrap();
        let photos = PhotoStore::new(dir.path());
        let service = ListingService::new(&pool, &photos);

        let result = service
            .create(
                UserId::new(404),
                ListingDetails::parse("Ghost", "1").unwrap(),
                UPLOAD,
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Repository(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_photo_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_memory_pool().await.unwrap();
        let photos = PhotoStore::new(dir.path());
        let owner = user(&pool, "owner").await;

        let err = ListingService::new(&pool, &photos)
            .create(
                owner,
                ListingDetails::parse("Lamp", "4").unwrap(),
                PhotoUpload {
                    file_name: "lamp.gif",
                    bytes: b"GIF89a",
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_user_error());
    }
}
