//! Registration and login routes.
//!
//! Both accept form-encoded `{username, password}` bodies (OAuth2
//! password-grant field names, so stock OAuth2 form clients work).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Form, Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::password;
use crate::db::{UserRecord, UserStore};
use crate::error::ServerError;
use crate::schemas::auth::{CredentialsForm, TokenResponse};
use crate::state::AppState;

/// Register auth routes (nested under `/auth`).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(token))
}

/// Create a user account (`POST /auth/register`).
///
/// 201 on success; 400 when the username is already registered.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ServerError> {
    if form.username.is_empty() || form.password.is_empty() {
        return Err(ServerError::BadRequest(
            "username and password must not be empty".into(),
        ));
    }

    if state.store.find_by_username(&form.username).await?.is_some() {
        return Err(ServerError::Conflict("username already registered".into()));
    }

    let record = UserRecord {
        id: Uuid::new_v4().to_string(),
        username: form.username.clone(),
        password_hash: password::hash(&form.password)
            .map_err(|e| ServerError::Internal(format!("password hashing failed: {e}")))?,
        is_active: true,
        created_at: Utc::now(),
    };

    if let Err(e) = state.store.create_user(record).await {
        // Lost the race against a concurrent registration of the same handle.
        if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
            return Err(ServerError::Conflict("username already registered".into()));
        }
        return Err(e.into());
    }

    info!(username = %form.username, "user registered");
    Ok((StatusCode::CREATED, Json(json!({ "msg": "user created" }))))
}

/// Exchange credentials for an access token (`POST /auth/token`).
///
/// 200 with `{access_token, token_type}`; 401 on bad credentials.  Unknown
/// usernames, wrong passwords, and inactive accounts are indistinguishable
/// to the caller.
pub async fn token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<TokenResponse>, ServerError> {
    let user = state.store.find_by_username(&form.username).await?;

    let Some(user) = user else {
        debug!(username = %form.username, "login for unknown username");
        return Err(ServerError::Unauthorized);
    };
    if !user.is_active || !password::verify(&form.password, &user.password_hash) {
        debug!(username = %form.username, "login rejected");
        return Err(ServerError::Unauthorized);
    }

    let access_token = state
        .tokens
        .issue(&user.id, None)
        .map_err(|e| ServerError::Internal(format!("token signing failed: {e}")))?;

    info!(username = %form.username, "token issued");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}
