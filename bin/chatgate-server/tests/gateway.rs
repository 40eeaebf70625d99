//! End-to-end tests for the auth routes and the request gate, driving the
//! real router against an in-memory SQLite store.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use chatgate_server::auth::token::TokenService;
use chatgate_server::config::{Config, DEFAULT_SYSTEM_PROMPT};
use chatgate_server::db::sqlite::SqliteStore;
use chatgate_server::db::UserStore;
use chatgate_server::routes;
use chatgate_server::state::AppState;

fn test_config(auth_required: bool, backend_url: &str) -> Config {
    Config {
        bind_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        secret: "test-secret".into(),
        backend_url: backend_url.into(),
        token_ttl_mins: 60,
        auth_required,
        include_history: true,
        system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        cors_allowed_origins: None,
        backend_read_timeout_secs: 5,
        backend_connect_timeout_secs: 2,
        log_level: "info".into(),
        log_json: false,
    }
}

async fn test_state(auth_required: bool, backend_url: &str) -> Arc<AppState> {
    let cfg = test_config(auth_required, backend_url);
    let store = SqliteStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let tokens = TokenService::new(&cfg.secret, chrono::Duration::minutes(cfg.token_ttl_mins));
    Arc::new(AppState {
        config: Arc::new(cfg),
        store: Arc::new(store),
        tokens: Arc::new(tokens),
        http: reqwest::Client::new(),
    })
}

fn form_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from(body.to_owned()))
        .expect("request")
}

fn chat_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/ai")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(
            serde_json::json!({ "message": "hi", "history": [] }).to_string(),
        ))
        .expect("request")
}

async fn body_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn register_then_login_issues_valid_token() {
    let state = test_state(true, "http://127.0.0.1:9/completion").await;
    let app = routes::build(state.clone());

    let resp = app
        .clone()
        .oneshot(form_request("/auth/register", "username=alice&password=secret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(form_request("/auth/token", "username=alice&password=secret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp.into_body()).await;
    assert_eq!(body["token_type"], "bearer");

    // The issued credential resolves back to alice's record.
    let subject = state
        .tokens
        .validate(body["access_token"].as_str().unwrap())
        .expect("valid token");
    let alice = state
        .store
        .find_by_username("alice")
        .await
        .unwrap()
        .expect("alice exists");
    assert_eq!(subject, alice.id);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let state = test_state(true, "http://127.0.0.1:9/completion").await;
    let app = routes::build(state);

    let resp = app
        .clone()
        .oneshot(form_request("/auth/register", "username=bob&password=pw1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(form_request("/auth/register", "username=bob&password=pw2"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let state = test_state(true, "http://127.0.0.1:9/completion").await;
    let app = routes::build(state);

    app.clone()
        .oneshot(form_request("/auth/register", "username=carol&password=right"))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(form_request("/auth/token", "username=carol&password=wrong"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(form_request("/auth/token", "username=nobody&password=x"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unauthenticated_chat_never_reaches_the_backend() {
    // Listen on a real socket so we can observe whether the gateway ever
    // tries to open a backend connection.
    let backend_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_url = format!("http://{}/completion", backend_listener.local_addr().unwrap());

    let state = test_state(true, &backend_url).await;
    let app = routes::build(state.clone());

    let resp = app.clone().oneshot(chat_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(chat_request(Some("garbage-token")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let expired = state
        .tokens
        .issue("ghost", Some(chrono::Duration::seconds(-5)))
        .unwrap();
    let resp = app.oneshot(chat_request(Some(&expired))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // No connection attempt should have arrived.
    let accepted =
        tokio::time::timeout(Duration::from_millis(200), backend_listener.accept()).await;
    assert!(accepted.is_err(), "gate leaked a request to the backend");
}

#[tokio::test]
async fn token_for_deleted_user_is_unauthorized() {
    let state = test_state(true, "http://127.0.0.1:9/completion").await;
    let app = routes::build(state.clone());

    // Valid signature, but the subject has no user record.
    let orphan = state.tokens.issue("no-such-user", None).unwrap();
    let resp = app.oneshot(chat_request(Some(&orphan))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_error_bodies_do_not_leak_detail() {
    let state = test_state(true, "http://127.0.0.1:9/completion").await;
    let app = routes::build(state);

    let resp = app
        .oneshot(chat_request(Some("garbage-token")))
        .await
        .unwrap();
    let body = body_json(resp.into_body()).await;
    assert_eq!(body["error"], "invalid authentication");
}
