//! Expired-token cleanup command.
//!
//! Expiry is enforced at verification regardless; this just keeps the table
//! from accumulating dead rows.

use pomelo_api::db::OtpTokenRepository;

use super::CommandError;

/// Delete all expired one-time codes.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let deleted = OtpTokenRepository::new(&pool)
        .delete_expired()
        .await
        .map_err(|e| CommandError::Other(e.to_string()))?;

    tracing::info!(deleted, "expired one-time codes removed");
    Ok(())
}
