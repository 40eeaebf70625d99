//! Auth route request / response types.

use serde::{Deserialize, Serialize};

/// Form body for `POST /auth/register` and `POST /auth/token`
/// (form-encoded, OAuth2 password-grant field names).
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Response body for a successful `POST /auth/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer credential.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}
