//! Signed, time-bounded access tokens (HS256 JWT).
//!
//! Tokens carry `{sub, iat, exp}` and nothing else.  There is no refresh or
//! rotation mechanism; re-login is the only renewal path.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Why a token was rejected.
///
/// The variants exist for logging; callers collapse all of them into a
/// single unauthenticated outcome before anything reaches the client.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token carries no subject")]
    MissingSubject,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    iat: i64,
    exp: i64,
}

/// Issues and validates access tokens with a process-wide symmetric secret.
///
/// Constructed once at startup from [`crate::config::Config`]; the keys are
/// immutable for the process lifetime, so concurrent validation needs no
/// synchronization.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenService(ttl={}m)", self.default_ttl.num_minutes())
    }
}

impl TokenService {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }

    /// Issue a signed token for `subject`, expiring `ttl` (or the configured
    /// default) from now.
    pub fn issue(
        &self,
        subject: &str,
        ttl: Option<Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let claims = Claims {
            sub: Some(subject.to_owned()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry; return the subject on success.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(TokenError::MissingSubject),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
