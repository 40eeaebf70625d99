//! Request gate for protected routes.
//!
//! Runs before any protected handler: extracts the bearer credential,
//! validates it, resolves the owning user record, and attaches the identity
//! to the request.  Unauthenticated requests are rejected here and never
//! reach the prompt builder or the relay.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::db::UserStore;
use crate::error::ServerError;
use crate::state::AppState;

/// Identity resolved by the gate, available to handlers via request
/// extensions.  Absent when `auth_required` is disabled.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// Authentication middleware for `/api` routes.
///
/// With `auth_required` disabled in config the gate is a no-op; the
/// deployment is then open and no identity is attached.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !state.config.auth_required {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        debug!("missing bearer credential");
        return Err(ServerError::Unauthorized);
    };

    let subject = state.tokens.validate(token).map_err(|e| {
        debug!(reason = %e, "credential rejected");
        ServerError::Unauthorized
    })?;

    let user = state.store.find_by_id(&subject).await?;
    let Some(user) = user else {
        warn!(subject = %subject, "credential subject has no user record");
        return Err(ServerError::Unauthorized);
    };
    if !user.is_active {
        warn!(subject = %subject, "inactive user rejected");
        return Err(ServerError::Unauthorized);
    }

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}
