//! One-time-code repository.
//!
//! The table holds at most one row per `(email, purpose)` pair. Issuing a
//! code upserts that row, so the previous code stops verifying the moment a
//! new one is written. Verification is a single DELETE with the full match in
//! the WHERE clause, which makes a code single-use without any locking: of
//! two concurrent verify attempts, exactly one deletes the row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pomelo_core::{Email, OtpPurpose};

use super::RepositoryError;

/// Repository for one-time-code database operations.
pub struct OtpTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OtpTokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a fresh code for `(email, purpose)`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace(
        &self,
        email: &Email,
        purpose: OtpPurpose,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth.otp_token (email, purpose, code, expires_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (email, purpose) DO UPDATE
             SET code = EXCLUDED.code,
                 created_at = NOW(),
                 expires_at = EXCLUDED.expires_at",
        )
        .bind(email.as_str())
        .bind(purpose)
        .bind(code)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Atomically consume a code: the row is deleted iff it matches and has
    /// not expired.
    ///
    /// # Returns
    ///
    /// Returns `true` if a live matching code existed (and is now spent).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume(
        &self,
        email: &Email,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM auth.otp_token
             WHERE email = $1 AND purpose = $2 AND code = $3 AND expires_at > NOW()",
        )
        .bind(email.as_str())
        .bind(purpose)
        .bind(code)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired codes (opportunistic cleanup; expiry is enforced at
    /// verification regardless).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth.otp_token WHERE expires_at < NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
