//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - Middleware layers (CORS; the auth gate is applied per-route-group)
//! - Health / heartbeat route
//! - `/auth` registration and login routes
//! - `/api` chat relay routes, behind the request gate

mod auth;
mod chat;
mod health;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors;
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
///
/// Request logging uses `tower-http`'s [`TraceLayer`] rather than a
/// body-buffering middleware: response bodies here are live streams and
/// must never be collected.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/api", chat::router(state.clone()))
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors::cors_layer(state.clone())),
        )
        .with_state(state)
}
