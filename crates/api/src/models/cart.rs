//! Cart domain types.

use chrono::{DateTime, Utc};

use pomelo_core::{CartId, CartItemId, VariantId};

/// An anonymous shopping cart.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Cart ID (random UUID, handed to the client).
    pub id: CartId,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// Line items, ordered by insertion.
    pub items: Vec<CartItem>,
}

/// A line item in a cart.
///
/// One row per `(cart, variant)` pair; quantity is adjusted in place.
#[derive(Debug, Clone)]
pub struct CartItem {
    /// Unique item ID.
    pub id: CartItemId,
    /// Owning cart.
    pub cart_id: CartId,
    /// The product variant in the cart.
    pub variant_id: VariantId,
    /// Units of the variant (always >= 1).
    pub quantity: i32,
    /// When the item was added.
    pub created_at: DateTime<Utc>,
}
