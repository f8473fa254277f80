//! Cart route handlers.
//!
//! Carts are anonymous: the UUID handed out at creation is the only
//! capability needed to read or mutate a cart.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pomelo_core::{CartId, CartItemId, VariantId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{Cart, CartItem};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Add-item request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Quantity-update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Public cart-item representation.
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub variant_id: VariantId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            variant_id: item.variant_id,
            quantity: item.quantity,
            created_at: item.created_at,
        }
    }
}

/// Public cart representation.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: CartId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartItemResponse>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id,
            created_at: cart.created_at,
            items: cart.items.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /carts` - Create an empty cart.
pub async fn create(State(state): State<AppState>) -> Result<(StatusCode, Json<CartResponse>)> {
    let cart = CartRepository::new(state.pool()).create().await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// `GET /carts/{id}` - Retrieve a cart with its items.
///
/// # Errors
///
/// Returns 404 if the cart doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CartId>,
) -> Result<Json<CartResponse>> {
    let cart = CartRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart".to_string()))?;

    Ok(Json(cart.into()))
}

/// `DELETE /carts/{id}` - Delete a cart.
///
/// # Errors
///
/// Returns 404 if the cart doesn't exist.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<CartId>) -> Result<StatusCode> {
    let deleted = CartRepository::new(state.pool()).delete(id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("cart".to_string()))
    }
}

/// `POST /carts/{id}/items` - Add a variant to a cart.
///
/// # Errors
///
/// Returns 404 for an unknown cart, 400 for an unknown variant, a
/// non-positive quantity, or a variant already in the cart.
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<CartId>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>)> {
    if body.quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }

    let carts = CartRepository::new(state.pool());
    if carts.get(id).await?.is_none() {
        return Err(AppError::NotFound("cart".to_string()));
    }

    let variant_exists = ProductRepository::new(state.pool())
        .variant_exists(body.variant_id)
        .await?;
    if !variant_exists {
        return Err(AppError::Validation("Unknown product variant.".to_string()));
    }

    let item = carts
        .add_item(id, body.variant_id, body.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::Validation(msg),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// `PATCH /carts/{id}/items/{item_id}` - Set an item's quantity.
///
/// # Errors
///
/// Returns 404 if the item doesn't exist in this cart, 400 for a
/// non-positive quantity.
pub async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(CartId, i64)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartItemResponse>> {
    if body.quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }

    let item = CartRepository::new(state.pool())
        .update_item_quantity(id, CartItemId::new(item_id), body.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("cart item".to_string()),
            other => other.into(),
        })?;

    Ok(Json(item.into()))
}

/// `DELETE /carts/{id}/items/{item_id}` - Remove an item from a cart.
///
/// # Errors
///
/// Returns 404 if the item doesn't exist in this cart.
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(CartId, i64)>,
) -> Result<StatusCode> {
    let removed = CartRepository::new(state.pool())
        .remove_item(id, CartItemId::new(item_id))
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("cart item".to_string()))
    }
}
