//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::config::Config;
use crate::db::sqlite::SqliteStore;

/// State shared across all HTTP handlers.
///
/// Everything here is immutable after startup; concurrent requests only
/// ever read it, so plain `Arc`s are enough.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent user-record store.
    pub store: Arc<SqliteStore>,
    /// Issues and validates access tokens.
    pub tokens: Arc<TokenService>,
    /// Shared HTTP client for backend connections.
    pub http: reqwest::Client,
}
