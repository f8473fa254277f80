//! Product repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use pomelo_core::{Price, ProductId, ProductStatus, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductVariant};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            variants,
        }
    }
}

/// Internal row type for variant queries.
#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: i64,
    product_id: i64,
    price: Price,
    stock: i32,
    created_at: DateTime<Utc>,
}

impl From<VariantRow> for ProductVariant {
    fn from(row: VariantRow) -> Self {
        Self {
            id: VariantId::new(row.id),
            product_id: ProductId::new(row.product_id),
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
        }
    }
}

/// A variant to insert alongside a new product.
#[derive(Debug, Clone, Copy)]
pub struct NewVariant {
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub stock: i32,
}

/// Fields to update on an existing product. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New publication status.
    pub status: Option<ProductStatus>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product together with its variants in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        status: ProductStatus,
        variants: &[NewVariant],
    ) -> Result<Product, RepositoryError> {
        let mut tx: Transaction<'_, Postgres> = self.pool.begin().await?;

        let row: ProductRow = sqlx::query_as(
            "INSERT INTO shop.product (name, description, status)
             VALUES ($1, $2, $3)
             RETURNING id, name, description, status, created_at, updated_at",
        )
        .bind(name)
        .bind(description)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        let mut created = Vec::with_capacity(variants.len());
        for variant in variants {
            let v: VariantRow = sqlx::query_as(
                "INSERT INTO shop.product_variant (product_id, price, stock)
                 VALUES ($1, $2, $3)
                 RETURNING id, product_id, price, stock, created_at",
            )
            .bind(row.id)
            .bind(variant.price)
            .bind(variant.stock)
            .fetch_one(&mut *tx)
            .await?;
            created.push(v.into());
        }

        tx.commit().await?;

        Ok(row.into_product(created))
    }

    /// Get a product with its variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, status, created_at, updated_at
             FROM shop.product
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let variants = self.list_variants(id).await?;
                Ok(Some(r.into_product(variants)))
            }
            None => Ok(None),
        }
    }

    /// List products with their variants, oldest first.
    ///
    /// Drafts are excluded unless `include_drafts` is set (staff readers).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, include_drafts: bool) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, status, created_at, updated_at
             FROM shop.product
             WHERE $1 OR status <> 'draft'
             ORDER BY id ASC",
        )
        .bind(include_drafts)
        .fetch_all(self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let variants = self.list_variants(ProductId::new(row.id)).await?;
            products.push(row.into_product(variants));
        }

        Ok(products)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "UPDATE shop.product
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 status = COALESCE($4, status),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, description, status, created_at, updated_at",
        )
        .bind(id.as_i64())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.status)
        .fetch_optional(self.pool)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        let variants = self.list_variants(id).await?;
        Ok(row.into_product(variants))
    }

    /// Delete a product (variants cascade).
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the variants of a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let rows: Vec<VariantRow> = sqlx::query_as(
            "SELECT id, product_id, price, stock, created_at
             FROM shop.product_variant
             WHERE product_id = $1
             ORDER BY id ASC",
        )
        .bind(product_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Check whether a variant exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variant_exists(&self, variant_id: VariantId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM shop.product_variant WHERE id = $1)",
        )
        .bind(variant_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}
