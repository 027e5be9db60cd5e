//! Product repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use bazaar_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, name, price, user_id, photo, created_at";

/// Row type for `products`, decoded into [`Product`].
#[derive(sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i64,
    name: String,
    price: String,
    user_id: i64,
    photo: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::parse(&r.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", r.id))
        })?;

        Ok(Self {
            id: ProductId::new(r.id),
            name: r.name,
            price,
            owner_id: UserId::new(r.user_id),
            photo: r.photo,
            created_at: r.created_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Get the products with the given IDs that still exist, ordered by id.
    ///
    /// IDs without a product are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(
        &self,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<ProductId> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// List the whole catalogue, oldest listing first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// List one seller's products, oldest listing first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = ? ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Insert a new listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// foreign key violation for an unknown owner).
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, price, user_id, photo) VALUES (?, ?, ?, ?) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.price)
        .bind(product.owner_id)
        .bind(&product.photo)
        .fetch_one(self.pool)
        .await?;

        Product::try_from(row)
    }

    /// Change a listing's name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        name: &str,
        price: Price,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = ?, price = ? WHERE id = ? RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(name)
        .bind(price)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Delete a listing.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Fetch a product on an open connection.
pub(super) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(Product::try_from).transpose()
}

/// Delete a product on an open connection.
pub(super) async fn delete_product(
    conn: &mut SqliteConnection,
    id: ProductId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
