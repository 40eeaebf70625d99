//! The chat relay route (`POST /api/ai`).
//!
//! The response body is a chunked `text/plain` stream of cleaned text
//! fragments; the stream ending is the only completion signal.  Stream-level
//! backend failures after the first byte terminate the body early (buffered
//! content flushed first) rather than producing an error status – the status
//! line has long been sent by then.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Extension, State};
use axum::http::header;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use futures::StreamExt;
use tracing::debug;

use crate::error::ServerError;
use crate::middleware::auth::{require_user, CurrentUser};
use crate::prompt::build_prompt;
use crate::relay::{self, RelayOptions};
use crate::schemas::chat::ChatRequest;
use crate::state::AppState;

/// Register chat routes (nested under `/api`), behind the request gate.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai", post(chat))
        .route_layer(from_fn_with_state(state, require_user))
}

/// Relay one chat request to the inference backend.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<CurrentUser>>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ServerError> {
    let history = if state.config.include_history {
        req.history.as_slice()
    } else {
        &[]
    };
    let prompt = build_prompt(&state.config.system_prompt, history, &req.message);

    debug!(
        user = user.as_ref().map(|u| u.0.username.as_str()).unwrap_or("<anonymous>"),
        history_turns = history.len(),
        prompt_bytes = prompt.len(),
        "relaying chat request"
    );

    let opts = RelayOptions {
        backend_url: state.config.backend_url.clone(),
        read_timeout: Duration::from_secs(state.config.backend_read_timeout_secs),
    };
    let chunks = relay::stream_completion(&state.http, &opts, &prompt).await?;

    let body = Body::from_stream(chunks.map(Ok::<Bytes, Infallible>));
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}
