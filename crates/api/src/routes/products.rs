//! Catalog route handlers.
//!
//! Plain CRUD over products and variants. Writes are staff-only; reads are
//! open, with draft products hidden from non-staff readers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pomelo_core::{Price, ProductId, ProductStatus, VariantId};

use crate::db::ProductRepository;
use crate::db::products::{NewVariant, ProductPatch};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAccount, RequireStaff};
use crate::models::{Product, ProductVariant};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Variant payload in a product-create request.
#[derive(Debug, Deserialize)]
pub struct CreateVariantRequest {
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

/// Product-create request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub variants: Vec<CreateVariantRequest>,
}

/// Product-update request body. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProductStatus>,
}

/// Public variant representation.
#[derive(Debug, Serialize)]
pub struct VariantResponse {
    pub id: VariantId,
    pub product_id: ProductId,
    pub price: Price,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ProductVariant> for VariantResponse {
    fn from(variant: ProductVariant) -> Self {
        Self {
            id: variant.id,
            product_id: variant.product_id,
            price: variant.price,
            stock: variant.stock,
            created_at: variant.created_at,
        }
    }
}

/// Public product representation.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub variants: Vec<VariantResponse>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            status: product.status,
            created_at: product.created_at,
            updated_at: product.updated_at,
            variants: product.variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Whether the principal may see draft products.
fn is_staff(principal: Option<&crate::models::Account>) -> bool {
    principal.is_some_and(|account| account.is_staff)
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /products` - Create a product with optional variants (staff only).
///
/// # Errors
///
/// Returns 400 for an empty name or a negative variant price.
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Product name cannot be empty.".to_string()));
    }

    let mut variants = Vec::with_capacity(body.variants.len());
    for variant in &body.variants {
        let price = Price::new(variant.price)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if variant.stock < 0 {
            return Err(AppError::Validation("Stock cannot be negative.".to_string()));
        }
        variants.push(NewVariant {
            price,
            stock: variant.stock,
        });
    }

    let product = ProductRepository::new(state.pool())
        .create(
            body.name.trim(),
            body.description.as_deref(),
            body.status,
            &variants,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `GET /products` - List products.
///
/// Draft products are included only for staff readers.
pub async fn index(
    State(state): State<AppState>,
    OptionalAccount(principal): OptionalAccount,
) -> Result<Json<Vec<ProductResponse>>> {
    let products = ProductRepository::new(state.pool())
        .list(is_staff(principal.as_ref()))
        .await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// `GET /products/{id}` - Retrieve a single product.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist, or is a draft and the reader
/// is not staff.
pub async fn show(
    State(state): State<AppState>,
    OptionalAccount(principal): OptionalAccount,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>> {
    let product = visible_product(&state, principal.as_ref(), ProductId::new(id)).await?;
    Ok(Json(product.into()))
}

/// `PATCH /products/{id}` - Update a product (staff only).
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    if let Some(name) = &body.name
        && name.trim().is_empty()
    {
        return Err(AppError::Validation("Product name cannot be empty.".to_string()));
    }

    let patch = ProductPatch {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
        status: body.status,
    };

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &patch)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("product".to_string()),
            other => other.into(),
        })?;

    Ok(Json(product.into()))
}

/// `DELETE /products/{id}` - Delete a product (staff only).
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
pub async fn destroy(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("product".to_string()))
    }
}

/// `GET /products/{id}/variants` - List a product's variants.
///
/// # Errors
///
/// Returns 404 under the same visibility rules as retrieval.
pub async fn list_variants(
    State(state): State<AppState>,
    OptionalAccount(principal): OptionalAccount,
    Path(id): Path<i64>,
) -> Result<Json<Vec<VariantResponse>>> {
    let product = visible_product(&state, principal.as_ref(), ProductId::new(id)).await?;
    Ok(Json(product.variants.into_iter().map(Into::into).collect()))
}

/// Fetch a product, applying draft visibility for the principal.
async fn visible_product(
    state: &AppState,
    principal: Option<&crate::models::Account>,
    id: ProductId,
) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    if product.status == ProductStatus::Draft && !is_staff(principal) {
        return Err(AppError::NotFound("product".to_string()));
    }

    Ok(product)
}
