//! Authentication extractors.
//!
//! The authenticated principal is an explicit handler parameter, never
//! ambient state: handlers that need an account take [`CurrentAccount`] (or
//! [`RequireStaff`]), handlers with optional authentication take
//! [`OptionalAccount`].

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::AccountRepository;
use crate::error::AppError;
use crate::models::Account;
use crate::state::AppState;

/// Extractor that requires a valid `Authorization: Bearer <access>` token.
///
/// Rejects with 401 if the header is missing, the token does not verify as
/// an access token, or the account no longer exists or was deactivated.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentAccount(account): CurrentAccount,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", account.email)
/// }
/// ```
pub struct CurrentAccount(pub Account);

impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let account = authenticate(parts, state)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication required.".to_string()))?;

        Ok(Self(account))
    }
}

/// Extractor that optionally authenticates the request.
///
/// A missing `Authorization` header yields `None`; a header that is present
/// but does not verify is still rejected with 401.
pub struct OptionalAccount(pub Option<Account>);

impl FromRequestParts<AppState> for OptionalAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).await?))
    }
}

/// Extractor that requires an authenticated staff account.
///
/// Rejects with 401 if unauthenticated and 403 if the account is not staff.
pub struct RequireStaff(pub Account);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAccount(account) = CurrentAccount::from_request_parts(parts, state).await?;

        if !account.is_staff {
            return Err(AppError::PermissionDenied);
        }

        Ok(Self(account))
    }
}

/// Resolve the bearer token in `parts` to an account, if a token is present.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<Account>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header.".to_string()))?;

    let account_id = state
        .jwt()
        .verify_access(token)
        .map_err(|_| AppError::Unauthorized("Invalid or expired access token.".to_string()))?;

    let account = AccountRepository::new(state.pool())
        .get_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists.".to_string()))?;

    if !account.is_active {
        return Err(AppError::Unauthorized("Account is deactivated.".to_string()));
    }

    Ok(Some(account))
}
