//! Shared newtype wrappers and enums.

pub mod email;
pub mod id;
pub mod otp;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{AccountId, CartId, CartItemId, ProductId, VariantId};
pub use otp::OtpPurpose;
pub use price::{Price, PriceError};
pub use status::ProductStatus;
