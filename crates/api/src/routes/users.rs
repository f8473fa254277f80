//! Account route handlers.
//!
//! Registration, OTP activation, email change, password change/reset, and
//! staff-only account management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pomelo_core::AccountId;

use crate::error::{AppError, Result};
use crate::middleware::{CurrentAccount, OptionalAccount, RequireStaff};
use crate::models::Account;
use crate::services::accounts::AccountService;
use crate::state::AppState;

/// Response message for successful activation.
const ACTIVATION_MESSAGE: &str =
    "Your email address has been confirmed. Account activated successfully.";

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Registration response body.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: AccountId,
    pub email: String,
}

/// Activation request body.
#[derive(Debug, Deserialize)]
pub struct ActivationRequest {
    pub email: String,
    pub otp: String,
}

/// Activation response body: fresh session credentials.
#[derive(Debug, Serialize)]
pub struct ActivationResponse {
    pub access: String,
    pub refresh: String,
    pub message: String,
}

/// Resend-activation request body.
#[derive(Debug, Deserialize)]
pub struct ResendActivationRequest {
    pub email: String,
}

/// Email-change request body.
#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub new_email: String,
}

/// Email-change confirmation body.
#[derive(Debug, Deserialize)]
pub struct ChangeEmailConfirmRequest {
    pub new_email: String,
    pub otp: String,
}

/// Password-reset request body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Password-reset confirmation body.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordConfirmRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Password-change request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Staff-only flag update body.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

/// Public account representation.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email.into_inner(),
            is_active: account.is_active,
            is_staff: account.is_staff,
            last_login: account.last_login,
            created_at: account.created_at,
        }
    }
}

fn service(state: &AppState) -> AccountService<'_> {
    AccountService::new(state.pool(), state.email(), state.jwt())
}

// =============================================================================
// Registration & Activation
// =============================================================================

/// `POST /auth/users` - Register a new account.
///
/// Creates the account inactive and mails a one-time activation code valid
/// for five minutes. Anonymous callers and staff may register accounts; an
/// authenticated non-staff caller is rejected.
///
/// # Errors
///
/// Returns 403 for authenticated non-staff callers, 400 for validation
/// failures and duplicate emails.
pub async fn register(
    State(state): State<AppState>,
    OptionalAccount(principal): OptionalAccount,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    if let Some(account) = principal
        && !account.is_staff
    {
        return Err(AppError::PermissionDenied);
    }

    let account = service(&state)
        .register(&body.email, &body.password, &body.password_confirm)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: account.id,
            email: account.email.into_inner(),
        }),
    ))
}

/// `PATCH /auth/users/activation` - Verify the OTP and activate the account.
///
/// On success the account is active, its first login is stamped, and a
/// session-credential pair is returned.
///
/// # Errors
///
/// Returns 400 if the account is unknown or already active, or if the code
/// is invalid or expired.
pub async fn activation(
    State(state): State<AppState>,
    Json(body): Json<ActivationRequest>,
) -> Result<Json<ActivationResponse>> {
    let (_, pair) = service(&state).activate(&body.email, &body.otp).await?;

    Ok(Json(ActivationResponse {
        access: pair.access,
        refresh: pair.refresh,
        message: ACTIVATION_MESSAGE.to_string(),
    }))
}

/// `POST /auth/users/resend-activation` - Re-issue the activation code.
///
/// The previous code stops verifying; exactly one new email is sent.
///
/// # Errors
///
/// Returns 400 if the account is unknown or already active (nothing is
/// issued, nothing is sent).
pub async fn resend_activation(
    State(state): State<AppState>,
    Json(body): Json<ResendActivationRequest>,
) -> Result<StatusCode> {
    service(&state).resend_activation(&body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Current Account
// =============================================================================

/// `GET /auth/users/me` - The authenticated account's profile.
pub async fn me(CurrentAccount(account): CurrentAccount) -> Json<AccountResponse> {
    Json(account.into())
}

/// `POST /auth/users/me/change-email` - Request an email change.
///
/// Stores the proposed address as pending and mails a confirmation code to
/// the NEW address.
///
/// # Errors
///
/// Returns 400 if the new address is invalid or already taken.
pub async fn change_email(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Json(body): Json<ChangeEmailRequest>,
) -> Result<StatusCode> {
    service(&state)
        .request_email_change(&account, &body.new_email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /auth/users/me/change-email/conformation` - Confirm an email change.
///
/// Succeeds only when the submitted address equals the stored pending value
/// AND the code verifies; the two failures are distinct.
///
/// # Errors
///
/// Returns 400 for a missing pending change, a mismatched address, or a bad
/// code.
pub async fn confirm_email_change(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Json(body): Json<ChangeEmailConfirmRequest>,
) -> Result<StatusCode> {
    service(&state)
        .confirm_email_change(&account, &body.new_email, &body.otp)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /auth/users/me/reset-password` - Request a password reset code.
///
/// Unauthenticated. Only active accounts can reset; an address that was
/// never verified must activate first.
///
/// # Errors
///
/// Returns 400 if the account is unknown or not yet active.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode> {
    service(&state).request_password_reset(&body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /auth/users/me/reset-password/conformation` - Confirm a password reset.
///
/// # Errors
///
/// Returns 400 under the request step's preconditions, for a bad code, or
/// for an invalid new password.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordConfirmRequest>,
) -> Result<StatusCode> {
    service(&state)
        .confirm_password_reset(
            &body.email,
            &body.otp,
            &body.new_password,
            &body.new_password_confirm,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /auth/users/me/change-password` - Change the password directly.
///
/// # Errors
///
/// Returns 400 if the current password is wrong or the new password fails
/// validation.
pub async fn change_password(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    service(&state)
        .change_password(
            &account,
            &body.current_password,
            &body.new_password,
            &body.new_password_confirm,
        )
        .await
        .map_err(|e| {
            // A wrong current password is a validation failure here, not a
            // challenge to re-authenticate.
            if matches!(e, crate::services::accounts::AccountError::InvalidCredentials) {
                AppError::Validation("Current password is incorrect.".to_string())
            } else {
                e.into()
            }
        })?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Staff Account Management
// =============================================================================

/// `GET /auth/users` - List all accounts (staff only).
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
) -> Result<Json<Vec<AccountResponse>>> {
    let accounts = service(&state).list_accounts().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// `GET /auth/users/{id}` - Retrieve an account (staff only).
///
/// # Errors
///
/// Returns 404 if the account doesn't exist.
pub async fn retrieve(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<i64>,
) -> Result<Json<AccountResponse>> {
    let account = service(&state)
        .get_account(AccountId::new(id))
        .await
        .map_err(|_| AppError::NotFound("account".to_string()))?;
    Ok(Json(account.into()))
}

/// `PATCH /auth/users/{id}` - Update an account's flags (staff only).
///
/// # Errors
///
/// Returns 404 if the account doesn't exist.
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>> {
    let account = service(&state)
        .update_account_flags(AccountId::new(id), body.is_active, body.is_staff)
        .await
        .map_err(|e| match e {
            crate::services::accounts::AccountError::AccountNotFound => {
                AppError::NotFound("account".to_string())
            }
            other => other.into(),
        })?;
    Ok(Json(account.into()))
}

/// `DELETE /auth/users/{id}` - Delete an account (staff only).
///
/// # Errors
///
/// Returns 404 if the account doesn't exist.
pub async fn destroy(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    service(&state)
        .delete_account(AccountId::new(id))
        .await
        .map_err(|_| AppError::NotFound("account".to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}
