//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness check
//! GET    /health/ready                 - Readiness check (database ping)
//!
//! # Accounts
//! POST   /auth/users/                  - Register (201, sends activation OTP)
//! PATCH  /auth/users/activation/       - Verify OTP, activate, mint tokens (200)
//! POST   /auth/users/resend-activation/ - Re-issue activation OTP (204)
//! GET    /auth/users/me                - Current account profile
//! POST   /auth/users/me/change-email   - Request email change (204)
//! POST   /auth/users/me/change-email/conformation - Confirm email change (204)
//! POST   /auth/users/me/reset-password - Request password reset (204)
//! POST   /auth/users/me/reset-password/conformation - Confirm password reset (204)
//! POST   /auth/users/me/change-password - Change password (204)
//! GET    /auth/users/                  - List accounts (staff)
//! GET    /auth/users/{id}              - Retrieve account (staff)
//! PATCH  /auth/users/{id}              - Update account flags (staff)
//! DELETE /auth/users/{id}              - Delete account (staff)
//!
//! # Session credentials
//! POST   /auth/jwt/create              - Login, mint token pair
//! POST   /auth/jwt/refresh             - Exchange refresh for access
//!
//! # Catalog
//! POST   /products                     - Create product (staff)
//! GET    /products                     - List products (drafts staff-only)
//! GET    /products/{id}                - Retrieve product
//! PATCH  /products/{id}                - Update product (staff)
//! DELETE /products/{id}                - Delete product (staff)
//! GET    /products/{id}/variants       - List variants
//!
//! # Carts
//! POST   /carts                        - Create cart
//! GET    /carts/{id}                   - Retrieve cart
//! DELETE /carts/{id}                   - Delete cart
//! POST   /carts/{id}/items             - Add item
//! PATCH  /carts/{id}/items/{item_id}   - Set item quantity
//! DELETE /carts/{id}/items/{item_id}   - Remove item
//! ```
//!
//! Trailing slashes in the legacy paths are handled by the normalize-path
//! layer installed in `main`.

pub mod carts;
pub mod jwt;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list))
        .route("/activation", patch(users::activation))
        .route("/resend-activation", post(users::resend_activation))
        .route("/me", get(users::me))
        .route("/me/change-email", post(users::change_email))
        .route(
            "/me/change-email/conformation",
            post(users::confirm_email_change),
        )
        .route("/me/reset-password", post(users::reset_password))
        .route(
            "/me/reset-password/conformation",
            post(users::confirm_password_reset),
        )
        .route("/me/change-password", post(users::change_password))
        .route(
            "/{id}",
            get(users::retrieve)
                .patch(users::update)
                .delete(users::destroy),
        )
}

/// Create the session-credential routes router.
pub fn jwt_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(jwt::create))
        .route("/refresh", post(jwt::refresh))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::index))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/{id}/variants", get(products::list_variants))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(carts::create))
        .route("/{id}", get(carts::show).delete(carts::destroy))
        .route("/{id}/items", post(carts::add_item))
        .route(
            "/{id}/items/{item_id}",
            patch(carts::update_item).delete(carts::remove_item),
        )
}

/// Create all routes for the API.
///
/// Auth endpoints sit behind the strict rate limiter (they issue OTP codes
/// and emails); catalog and cart endpoints use the relaxed one.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth/users", user_routes().layer(auth_rate_limiter()))
        .nest("/auth/jwt", jwt_routes().layer(auth_rate_limiter()))
        .nest("/products", product_routes().layer(api_rate_limiter()))
        .nest("/carts", cart_routes().layer(api_rate_limiter()))
}
