//! Session-credential minting and verification.
//!
//! Accounts receive an access/refresh JWT pair when they activate or log in.
//! Claims carry a `token_type` so a refresh token can never be presented as
//! an access token (or vice versa).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pomelo_core::AccountId;

/// Access token lifetime.
const ACCESS_TTL_MINUTES: i64 = 15;
/// Refresh token lifetime.
const REFRESH_TTL_DAYS: i64 = 7;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Encoding or decoding failed (bad signature, malformed, expired).
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The token verified but carries the wrong `token_type`.
    #[error("wrong token type")]
    WrongTokenType,

    /// The `sub` claim is not a valid account ID.
    #[error("invalid subject claim")]
    InvalidSubject,
}

/// Whether a token grants API access or only a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: String,
    /// Expiration time (unix seconds).
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Access or refresh.
    pub token_type: TokenType,
}

impl Claims {
    fn new(account_id: AccountId, token_type: TokenType, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            token_type,
        }
    }
}

/// An access/refresh token pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Short-lived token presented as `Authorization: Bearer`.
    pub access: String,
    /// Long-lived token exchanged for fresh access tokens.
    pub refresh: String,
}

/// Mints and verifies session credentials.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Create a new JWT service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation: Validation::default(),
        }
    }

    /// Mint an access/refresh pair for an account.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Invalid` if encoding fails.
    pub fn mint(&self, account_id: AccountId) -> Result<TokenPair, JwtError> {
        let access = self.encode(&Claims::new(
            account_id,
            TokenType::Access,
            Duration::minutes(ACCESS_TTL_MINUTES),
        ))?;
        let refresh = self.encode(&Claims::new(
            account_id,
            TokenType::Refresh,
            Duration::days(REFRESH_TTL_DAYS),
        ))?;

        Ok(TokenPair { access, refresh })
    }

    /// Verify an access token and return the account it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Invalid` for bad signatures, malformed or expired
    /// tokens; `JwtError::WrongTokenType` if a refresh token is presented.
    pub fn verify_access(&self, token: &str) -> Result<AccountId, JwtError> {
        self.verify(token, TokenType::Access)
    }

    /// Verify a refresh token and return the account it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Invalid` for bad signatures, malformed or expired
    /// tokens; `JwtError::WrongTokenType` if an access token is presented.
    pub fn verify_refresh(&self, token: &str) -> Result<AccountId, JwtError> {
        self.verify(token, TokenType::Refresh)
    }

    /// Mint a fresh access token only (refresh flow).
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Invalid` if encoding fails.
    pub fn mint_access(&self, account_id: AccountId) -> Result<String, JwtError> {
        self.encode(&Claims::new(
            account_id,
            TokenType::Access,
            Duration::minutes(ACCESS_TTL_MINUTES),
        ))
    }

    fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<AccountId, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        if data.claims.token_type != expected {
            return Err(JwtError::WrongTokenType);
        }

        let id: i64 = data
            .claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidSubject)?;

        Ok(AccountId::new(id))
    }
}
