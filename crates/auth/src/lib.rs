//! `yatube-auth`: token verification and the ownership policy.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns a
//! bearer token into verified claims and decides whether an identity may
//! mutate a record.

pub mod authorize;
pub mod claims;
pub mod identity;
pub mod jwt;

pub use authorize::{AuthzError, can_write, require_authenticated, require_owner};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use identity::Identity;
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
