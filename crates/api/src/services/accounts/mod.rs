//! Account workflow service.
//!
//! Owns the verification state machine: an account is created inactive,
//! becomes active exactly once when its activation code verifies, and from
//! then on can confirm pending email changes and password resets through the
//! same one-time-code mechanism.
//!
//! Preconditions are asymmetric on purpose: resending an activation code
//! requires the account to still be INACTIVE, while requesting a password
//! reset requires it to be ACTIVE (an unverified address must be verified
//! first, not recovered).

mod error;

pub use error::AccountError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use pomelo_core::{AccountId, Email, OtpPurpose};

use crate::db::{
    AccountRepository, PendingEmailChangeRepository, RepositoryError,
};
use crate::models::Account;
use crate::services::email::EmailService;
use crate::services::jwt::{JwtService, TokenPair};
use crate::services::otp::TokenService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Account workflow service.
///
/// Handles registration, OTP-gated activation, email change, password change
/// and reset, and login.
pub struct AccountService<'a> {
    accounts: AccountRepository<'a>,
    pending: PendingEmailChangeRepository<'a>,
    tokens: TokenService<'a>,
    email: &'a EmailService,
    jwt: &'a JwtService,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService, jwt: &'a JwtService) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            pending: PendingEmailChangeRepository::new(pool),
            tokens: TokenService::new(pool),
            email,
            jwt,
        }
    }

    // =========================================================================
    // Registration & Activation
    // =========================================================================

    /// Register a new account with email and password.
    ///
    /// The account starts inactive; an activation code is issued and mailed
    /// to the address. The account cannot authenticate until it activates.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` if the email format is invalid.
    /// Returns `AccountError::WeakPassword` / `PasswordMismatch` if the
    /// password fails validation.
    /// Returns `AccountError::DuplicateAccount` if the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Account, AccountError> {
        let email = Email::parse(email)?;
        validate_password(password, password_confirm)?;
        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create_inactive(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::DuplicateAccount,
                other => AccountError::Repository(other),
            })?;

        self.issue_and_dispatch(&account.email, OtpPurpose::Activation)
            .await?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Activate an account by verifying its activation code.
    ///
    /// On success the account flips to active, its first login is stamped,
    /// and a session-credential pair is minted. Activation is single-shot:
    /// re-running it for an active account fails even with a fresh code.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` if the email is unknown.
    /// Returns `AccountError::AlreadyActive` if the account is active.
    /// Returns `AccountError::InvalidOrExpiredToken` if the code fails.
    pub async fn activate(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(Account, TokenPair), AccountError> {
        let email = Email::parse(email)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if account.is_active {
            return Err(AccountError::AlreadyActive);
        }

        self.tokens
            .verify(&email, OtpPurpose::Activation, code)
            .await?;

        // The `NOT is_active` guard in the UPDATE closes the race between two
        // concurrent activation requests: only one flips the flag.
        let account = self.accounts.activate(account.id).await.map_err(|e| {
            if matches!(e, RepositoryError::NotFound) {
                AccountError::AlreadyActive
            } else {
                AccountError::Repository(e)
            }
        })?;

        let pair = self.jwt.mint(account.id)?;

        tracing::info!(account_id = %account.id, "account activated");
        Ok((account, pair))
    }

    /// Re-issue the activation code for an inactive account.
    ///
    /// The previous code stops verifying; exactly one new email is sent.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` if the email is unknown.
    /// Returns `AccountError::AlreadyActive` if the account is already
    /// active - nothing is issued and nothing is sent.
    pub async fn resend_activation(&self, email: &str) -> Result<(), AccountError> {
        let email = Email::parse(email)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if account.is_active {
            return Err(AccountError::AlreadyActive);
        }

        self.issue_and_dispatch(&account.email, OtpPurpose::Activation)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Login & Refresh
    // =========================================================================

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the email/password is
    /// wrong. Returns `AccountError::NotYetActive` if the account has not
    /// verified its email address.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Account, TokenPair), AccountError> {
        let email = Email::parse(email)?;

        let (account, password_hash) = self
            .accounts
            .get_password_hash(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !account.is_active {
            return Err(AccountError::NotYetActive);
        }

        self.accounts.touch_last_login(account.id).await?;
        let pair = self.jwt.mint(account.id)?;

        Ok((account, pair))
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the refresh token does
    /// not verify or the account no longer exists or is deactivated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AccountError> {
        let account_id = self
            .jwt
            .verify_refresh(refresh_token)
            .map_err(|_| AccountError::InvalidCredentials)?;

        let account = self
            .accounts
            .get_by_id(account_id)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !account.is_active {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(self.jwt.mint_access(account.id)?)
    }

    // =========================================================================
    // Email Change
    // =========================================================================

    /// Request an email change for an authenticated account.
    ///
    /// Stores the proposed address as pending and mails a confirmation code
    /// to the NEW address (proof of control). Re-requesting replaces the
    /// pending value and invalidates the previous code.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateAccount` if the new email is taken.
    pub async fn request_email_change(
        &self,
        account: &Account,
        new_email: &str,
    ) -> Result<(), AccountError> {
        let new_email = Email::parse(new_email)?;

        if self.accounts.email_exists(&new_email).await? {
            return Err(AccountError::DuplicateAccount);
        }

        self.pending.replace(account.id, &new_email).await?;
        self.issue_and_dispatch(&new_email, OtpPurpose::EmailChange)
            .await?;

        Ok(())
    }

    /// Confirm a pending email change.
    ///
    /// Succeeds only when the submitted address equals the stored pending
    /// value AND the code verifies for that address. The two failures are
    /// distinct: a mismatched address does not spend the code.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NoPendingChange` if nothing is pending.
    /// Returns `AccountError::EmailMismatch` if the submitted address
    /// differs from the pending one.
    /// Returns `AccountError::InvalidOrExpiredToken` if the code fails.
    pub async fn confirm_email_change(
        &self,
        account: &Account,
        new_email: &str,
        code: &str,
    ) -> Result<Account, AccountError> {
        let new_email = Email::parse(new_email)?;

        let pending = self
            .pending
            .get(account.id)
            .await?
            .ok_or(AccountError::NoPendingChange)?;

        if pending.new_email != new_email {
            return Err(AccountError::EmailMismatch);
        }

        self.tokens
            .verify(&pending.new_email, OtpPurpose::EmailChange, code)
            .await?;

        self.accounts
            .update_email(account.id, &pending.new_email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::DuplicateAccount,
                other => AccountError::Repository(other),
            })?;
        self.pending.delete(account.id).await?;

        let account = self
            .accounts
            .get_by_id(account.id)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        tracing::info!(account_id = %account.id, "email change confirmed");
        Ok(account)
    }

    // =========================================================================
    // Password Reset & Change
    // =========================================================================

    /// Request a password reset code.
    ///
    /// Only active accounts can reset: an address that was never verified
    /// must go through activation first.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` if the email is unknown.
    /// Returns `AccountError::NotYetActive` if the account is inactive.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        let email = Email::parse(email)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if !account.is_active {
            return Err(AccountError::NotYetActive);
        }

        self.issue_and_dispatch(&account.email, OtpPurpose::PasswordReset)
            .await?;

        Ok(())
    }

    /// Confirm a password reset with the emailed code.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` / `NotYetActive` under the
    /// same preconditions as the request step.
    /// Returns `AccountError::InvalidOrExpiredToken` if the code fails.
    /// Returns `AccountError::WeakPassword` / `PasswordMismatch` if the new
    /// password fails validation.
    pub async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
        new_password_confirm: &str,
    ) -> Result<(), AccountError> {
        let email = Email::parse(email)?;

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if !account.is_active {
            return Err(AccountError::NotYetActive);
        }

        validate_password(new_password, new_password_confirm)?;

        self.tokens
            .verify(&email, OtpPurpose::PasswordReset, code)
            .await?;

        let password_hash = hash_password(new_password)?;
        self.accounts
            .update_password_hash(account.id, &password_hash)
            .await?;

        tracing::info!(account_id = %account.id, "password reset confirmed");
        Ok(())
    }

    /// Change the password of an authenticated account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the current password is
    /// wrong. Returns `AccountError::WeakPassword` / `PasswordMismatch` if
    /// the new password fails validation.
    pub async fn change_password(
        &self,
        account: &Account,
        current_password: &str,
        new_password: &str,
        new_password_confirm: &str,
    ) -> Result<(), AccountError> {
        let (_, password_hash) = self
            .accounts
            .get_password_hash(&account.email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        verify_password(current_password, &password_hash)?;
        validate_password(new_password, new_password_confirm)?;

        let new_hash = hash_password(new_password)?;
        self.accounts
            .update_password_hash(account.id, &new_hash)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Staff Account Management
    // =========================================================================

    /// List all accounts.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the database operation fails.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.accounts.list().await?)
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` if the account doesn't exist.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AccountError> {
        self.accounts
            .get_by_id(id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }

    /// Update an account's flags.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` if the account doesn't exist.
    pub async fn update_account_flags(
        &self,
        id: AccountId,
        is_active: Option<bool>,
        is_staff: Option<bool>,
    ) -> Result<Account, AccountError> {
        self.accounts
            .update_flags(id, is_active, is_staff)
            .await
            .map_err(|e| {
                if matches!(e, RepositoryError::NotFound) {
                    AccountError::AccountNotFound
                } else {
                    AccountError::Repository(e)
                }
            })
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::AccountNotFound` if the account doesn't exist.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        if self.accounts.delete(id).await? {
            Ok(())
        } else {
            Err(AccountError::AccountNotFound)
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Issue a code for `(email, purpose)` and dispatch the matching email.
    ///
    /// Dispatch is fire-and-forget: a transport failure is logged and does
    /// not fail the operation that triggered it.
    async fn issue_and_dispatch(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<(), AccountError> {
        let code = self.tokens.issue(email, purpose).await?;

        let result = match purpose {
            OtpPurpose::Activation => self.email.send_activation_code(email.as_str(), &code).await,
            OtpPurpose::EmailChange => {
                self.email
                    .send_email_change_code(email.as_str(), &code)
                    .await
            }
            OtpPurpose::PasswordReset => {
                self.email
                    .send_password_reset_code(email.as_str(), &code)
                    .await
            }
        };

        if let Err(e) = result {
            tracing::error!(email = %email, %purpose, error = %e, "failed to dispatch code email");
        }

        Ok(())
    }
}

/// Validate a password and its confirmation.
fn validate_password(password: &str, password_confirm: &str) -> Result<(), AccountError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password != password_confirm {
        return Err(AccountError::PasswordMismatch);
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// Public so the CLI can create staff accounts with the same parameters.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AccountError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AccountError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short", "short"),
            Err(AccountError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_mismatch() {
        assert!(matches!(
            validate_password("Test_1234", "Test_12345"),
            Err(AccountError::PasswordMismatch)
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("Test_1234", "Test_1234").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Test_1234").unwrap();
        assert!(verify_password("Test_1234", &hash).is_ok());
        assert!(matches!(
            verify_password("Wrong_1234", &hash),
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("Test_1234").unwrap();
        let b = hash_password("Test_1234").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("Test_1234", "not-a-phc-string"),
            Err(AccountError::InvalidCredentials)
        ));
    }
}
