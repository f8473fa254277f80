//! Catalog domain types.

use chrono::{DateTime, Utc};

use pomelo_core::{Price, ProductId, ProductStatus, VariantId};

/// A catalog product with its variants.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Publication status; drafts are staff-only.
    pub status: ProductStatus,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
    /// Purchasable variants, ordered by ID.
    pub variants: Vec<ProductVariant>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone)]
pub struct ProductVariant {
    /// Unique variant ID.
    pub id: VariantId,
    /// Owning product.
    pub product_id: ProductId,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub stock: i32,
    /// When the variant was created.
    pub created_at: DateTime<Utc>,
}
