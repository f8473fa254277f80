//! Staff account creation command.
//!
//! Creates an account that is active and staff from the start - staff
//! onboarding happens over a trusted channel, not the public OTP flow.

use pomelo_api::db::AccountRepository;
use pomelo_api::services::accounts::hash_password;
use pomelo_core::Email;

use super::CommandError;

/// Create a staff account.
///
/// # Errors
///
/// Returns an error if the email is invalid, already taken, or the database
/// operation fails.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Other(format!("invalid email: {e}")))?;
    let password_hash =
        hash_password(password).map_err(|e| CommandError::Other(e.to_string()))?;

    let pool = super::connect().await?;
    let accounts = AccountRepository::new(&pool);

    let account = accounts
        .create_inactive(&email, &password_hash)
        .await
        .map_err(|e| CommandError::Other(e.to_string()))?;
    let account = accounts
        .update_flags(account.id, Some(true), Some(true))
        .await
        .map_err(|e| CommandError::Other(e.to_string()))?;

    tracing::info!(account_id = %account.id, email = %account.email, "staff account created");
    Ok(())
}
