//! Cart repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pomelo_core::{CartId, CartItemId, VariantId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    created_at: DateTime<Utc>,
}

/// Internal row type for cart-item queries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    cart_id: Uuid,
    variant_id: i64,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            cart_id: CartId::from_uuid(row.cart_id),
            variant_id: VariantId::new(row.variant_id),
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty cart with a freshly generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self) -> Result<Cart, RepositoryError> {
        let id = CartId::generate();

        let row: CartRow = sqlx::query_as(
            "INSERT INTO shop.cart (id) VALUES ($1) RETURNING id, created_at",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(Cart {
            id: CartId::from_uuid(row.id),
            created_at: row.created_at,
            items: Vec::new(),
        })
    }

    /// Get a cart with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row: Option<CartRow> =
            sqlx::query_as("SELECT id, created_at FROM shop.cart WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<CartItemRow> = sqlx::query_as(
            "SELECT id, cart_id, variant_id, quantity, created_at
             FROM shop.cart_item
             WHERE cart_id = $1
             ORDER BY id ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Cart {
            id: CartId::from_uuid(row.id),
            created_at: row.created_at,
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    /// Delete a cart (items cascade).
    ///
    /// # Returns
    ///
    /// Returns `true` if the cart was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CartId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a variant to a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the variant is already in the
    /// cart. Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row: CartItemRow = sqlx::query_as(
            "INSERT INTO shop.cart_item (cart_id, variant_id, quantity)
             VALUES ($1, $2, $3)
             RETURNING id, cart_id, variant_id, quantity, created_at",
        )
        .bind(cart_id)
        .bind(variant_id.as_i64())
        .bind(quantity)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "variant already in cart"))?;

        Ok(row.into())
    }

    /// Set the quantity of a cart item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist in this
    /// cart.
    pub async fn update_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row: Option<CartItemRow> = sqlx::query_as(
            "UPDATE shop.cart_item
             SET quantity = $3
             WHERE id = $2 AND cart_id = $1
             RETURNING id, cart_id, variant_id, quantity, created_at",
        )
        .bind(cart_id)
        .bind(item_id.as_i64())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Remove an item from a cart.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was removed, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_item WHERE id = $2 AND cart_id = $1")
            .bind(cart_id)
            .bind(item_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
