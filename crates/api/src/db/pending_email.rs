//! Pending email-change repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pomelo_core::{AccountId, Email};

use super::RepositoryError;
use crate::models::PendingEmailChange;

/// Internal row type for pending email-change queries.
#[derive(Debug, sqlx::FromRow)]
struct PendingEmailChangeRow {
    account_id: i64,
    new_email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PendingEmailChangeRow> for PendingEmailChange {
    type Error = RepositoryError;

    fn try_from(row: PendingEmailChangeRow) -> Result<Self, Self::Error> {
        let new_email = Email::parse(&row.new_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            account_id: AccountId::new(row.account_id),
            new_email,
            created_at: row.created_at,
        })
    }
}

/// Repository for pending email-change operations.
pub struct PendingEmailChangeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PendingEmailChangeRepository<'a> {
    /// Create a new pending email-change repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a proposed new email for an account, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace(
        &self,
        account_id: AccountId,
        new_email: &Email,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth.pending_email_change (account_id, new_email)
             VALUES ($1, $2)
             ON CONFLICT (account_id) DO UPDATE
             SET new_email = EXCLUDED.new_email, created_at = NOW()",
        )
        .bind(account_id.as_i64())
        .bind(new_email.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get the pending change for an account, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        account_id: AccountId,
    ) -> Result<Option<PendingEmailChange>, RepositoryError> {
        let row: Option<PendingEmailChangeRow> = sqlx::query_as(
            "SELECT account_id, new_email, created_at
             FROM auth.pending_email_change
             WHERE account_id = $1",
        )
        .bind(account_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Delete the pending change for an account.
    ///
    /// # Returns
    ///
    /// Returns `true` if a pending change existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, account_id: AccountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth.pending_email_change WHERE account_id = $1")
            .bind(account_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
