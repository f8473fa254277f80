//! Account domain types.

use chrono::{DateTime, Utc};

use pomelo_core::{AccountId, Email};

/// A registered account (domain type).
///
/// Created inactive; flips to active exactly once, when the activation OTP
/// verifies. The password hash never leaves the `db` and `services` layers.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// The account's email address.
    pub email: Email,
    /// Whether the email has been verified and the account can authenticate.
    pub is_active: bool,
    /// Whether the account may manage the catalog and other accounts.
    pub is_staff: bool,
    /// Whether the account has unrestricted access.
    pub is_superuser: bool,
    /// Last successful authentication, if any.
    pub last_login: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A proposed email-address change awaiting confirmation (domain type).
#[derive(Debug, Clone)]
pub struct PendingEmailChange {
    /// The account requesting the change.
    pub account_id: AccountId,
    /// The proposed new address, already normalized.
    pub new_email: Email,
    /// When the change was requested.
    pub created_at: DateTime<Utc>,
}
