//! Account workflow error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::jwt::JwtError;
use crate::services::otp::TokenError;

/// Errors that can occur during account workflow operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] pomelo_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation do not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// An account already uses this email.
    #[error("user with this email already exists")]
    DuplicateAccount,

    /// No account exists for the email.
    #[error("no account found for this email")]
    AccountNotFound,

    /// The submitted one-time code did not verify.
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    /// The account is already activated.
    #[error("account already activated")]
    AlreadyActive,

    /// The account has not been activated yet.
    #[error("account is not activated")]
    NotYetActive,

    /// The submitted new email does not match the stored pending value.
    #[error("email does not match the pending change")]
    EmailMismatch,

    /// No email change is pending for this account.
    #[error("no pending email change")]
    NoPendingChange,

    /// Wrong password (login or change-password).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Session-credential minting error.
    #[error("token minting error: {0}")]
    Jwt(#[from] JwtError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<TokenError> for AccountError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidOrExpired => Self::InvalidOrExpiredToken,
            TokenError::Repository(inner) => Self::Repository(inner),
        }
    }
}
