//! Application services.
//!
//! Services own the business rules and compose repositories with the outbound
//! collaborators (SMTP, JWT signing). Route handlers stay thin: validate the
//! payload shape, call a service, map the result.

pub mod accounts;
pub mod email;
pub mod jwt;
pub mod otp;

pub use accounts::{AccountError, AccountService};
pub use email::{EmailError, EmailService};
pub use jwt::{JwtError, JwtService, TokenPair};
pub use otp::{TokenError, TokenService};
