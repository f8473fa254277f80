//! Session-credential route handlers (login and refresh).

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::routes::users::AccountResponse;
use crate::services::accounts::AccountService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct CreateTokenResponse {
    pub access: String,
    pub refresh: String,
    pub user: AccountResponse,
}

/// Refresh request body.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Refresh response body.
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access: String,
}

/// `POST /auth/jwt/create` - Authenticate and mint a token pair.
///
/// # Errors
///
/// Returns 401 for wrong credentials and 400 for an account that has not
/// activated yet.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTokenRequest>,
) -> Result<Json<CreateTokenResponse>> {
    let (account, pair) = AccountService::new(state.pool(), state.email(), state.jwt())
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(CreateTokenResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: account.into(),
    }))
}

/// `POST /auth/jwt/refresh` - Exchange a refresh token for a fresh access token.
///
/// # Errors
///
/// Returns 401 if the refresh token does not verify or the account is gone
/// or deactivated.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>> {
    let access = AccountService::new(state.pool(), state.email(), state.jwt())
        .refresh(&body.refresh)
        .await?;

    Ok(Json(RefreshTokenResponse { access }))
}
