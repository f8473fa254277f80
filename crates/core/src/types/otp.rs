//! One-time-password purposes.

use serde::{Deserialize, Serialize};

/// The workflow a one-time code was issued for.
///
/// At most one live code exists per `(email, purpose)` pair; a code issued
/// for one purpose never verifies for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "auth.otp_purpose", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    /// Account activation after registration.
    Activation,
    /// Confirming a pending email-address change.
    EmailChange,
    /// Confirming a password reset.
    PasswordReset,
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activation => write!(f, "activation"),
            Self::EmailChange => write!(f, "email_change"),
            Self::PasswordReset => write!(f, "password_reset"),
        }
    }
}

impl std::str::FromStr for OtpPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activation" => Ok(Self::Activation),
            "email_change" => Ok(Self::EmailChange),
            "password_reset" => Ok(Self::PasswordReset),
            _ => Err(format!("invalid otp purpose: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for purpose in [
            OtpPurpose::Activation,
            OtpPurpose::EmailChange,
            OtpPurpose::PasswordReset,
        ] {
            let parsed: OtpPurpose = purpose.to_string().parse().unwrap();
            assert_eq!(parsed, purpose);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OtpPurpose::EmailChange).unwrap(),
            "\"email_change\""
        );
    }
}
