//! `depot-auth` — stateless, token-carried identity.
//!
//! This crate is intentionally decoupled from HTTP and storage: the API
//! layer extracts the bearer token and hands it here; user records live in
//! the store crate.

pub mod claims;
pub mod password;
pub mod token;
pub mod user;

pub use claims::{validate_claims, Claims, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{TokenCodec, TokenError};
pub use user::{NewUser, User};
