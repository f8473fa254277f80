//! One-time-code issuance and verification.
//!
//! Codes are 6-digit shared secrets bound to an `(email, purpose)` pair and
//! valid for five minutes. Issuing a new code for a pair invalidates the
//! previous one; verifying a code spends it.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use pomelo_core::{Email, OtpPurpose};

use crate::db::{OtpTokenRepository, RepositoryError};

/// How long an issued code stays valid.
const OTP_TTL_MINUTES: i64 = 5;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No live code matched the submitted value.
    #[error("invalid or expired token")]
    InvalidOrExpired,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Issues and verifies one-time codes.
pub struct TokenService<'a> {
    tokens: OtpTokenRepository<'a>,
}

impl<'a> TokenService<'a> {
    /// Create a new token service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            tokens: OtpTokenRepository::new(pool),
        }
    }

    /// Issue a fresh code for `(email, purpose)`.
    ///
    /// Any previously issued, unexpired code for the same pair stops
    /// verifying. Returns the code so the caller can dispatch it.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Repository` if the database operation fails.
    pub async fn issue(&self, email: &Email, purpose: OtpPurpose) -> Result<String, TokenError> {
        let code = generate_otp_code();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        self.tokens.replace(email, purpose, &code, expires_at).await?;

        tracing::debug!(email = %email, %purpose, "issued one-time code");
        Ok(code)
    }

    /// Verify and spend a code.
    ///
    /// Succeeds iff a code exists for `(email, purpose)`, is unexpired, and
    /// the value matches. A successful check deletes the code, so it cannot
    /// be used twice.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidOrExpired` if no live matching code
    /// exists. Returns `TokenError::Repository` if the database operation
    /// fails.
    pub async fn verify(
        &self,
        email: &Email,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), TokenError> {
        if self.tokens.consume(email, purpose, code).await? {
            Ok(())
        } else {
            Err(TokenError::InvalidOrExpired)
        }
    }
}

/// Generate a 6-digit one-time code.
#[must_use]
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_code_format() {
        let code = generate_otp_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_otp_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_otp_code().parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }
}
