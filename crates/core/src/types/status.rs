//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Product publication status.
///
/// `Draft` products are only visible to staff; `Archived` products remain
/// readable but are no longer sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.product_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Published and purchasable.
    #[default]
    Active,
    /// Retired from sale but kept for order history.
    Archived,
    /// Work in progress, hidden from non-staff readers.
    Draft,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Archived => write!(f, "archived"),
            Self::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "draft" => Ok(Self::Draft),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in [
            ProductStatus::Active,
            ProductStatus::Archived,
            ProductStatus::Draft,
        ] {
            let parsed: ProductStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProductStatus::Draft).unwrap(),
            "\"draft\""
        );
    }

    #[test]
    fn test_default_is_active() {
        assert_eq!(ProductStatus::default(), ProductStatus::Active);
    }
}
