//! Domain types.
//!
//! These types represent validated domain objects separate from database row
//! types and request/response payloads.

pub mod account;
pub mod cart;
pub mod product;

pub use account::{Account, PendingEmailChange};
pub use cart::{Cart, CartItem};
pub use product::{Product, ProductVariant};
