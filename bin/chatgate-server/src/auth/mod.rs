//! Credential issuance and validation.
//!
//! Two independent primitives live here: the signed access token
//! ([`token::TokenService`]) and the password hash ([`password`]).  Neither
//! keeps any per-session server state; a token's validity is solely a
//! function of its signature and expiry.

pub mod password;
pub mod token;
