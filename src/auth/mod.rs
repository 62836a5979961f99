//! Credential primitives: password hashing, bearer tokens and the extractor
//! that guards protected routes.

mod claims;
pub(crate) mod extractors;
pub mod jwt;
pub mod password;

pub use extractors::AuthUser;
pub use jwt::{TokenError, TokenIssuer};
pub use password::{PasswordError, PasswordHasher};
