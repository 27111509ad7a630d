//! Shared harness for API integration tests.
//!
//! Mirrors the router construction in `main.rs` (via
//! [`build_app_router`]) so tests exercise the same middleware stack
//! that production uses. Tokens are minted locally with the test secret.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use faultline_api::auth::jwt::{generate_access_token, JwtConfig};
use faultline_api::cache::CacheCoordinator;
use faultline_api::config::ServerConfig;
use faultline_api::router::build_app_router;
use faultline_api::state::AppState;
use faultline_api::ws::WsManager;
use faultline_core::types::DbId;
use faultline_events::EventBus;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        cache_ttl_secs: 1800,
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
        cache: CacheCoordinator::in_memory(Duration::from_secs(config.cache_ttl_secs)),
    };
    build_app_router(state, &config)
}

/// Mint a Bearer header value for the given user.
pub fn bearer(user_id: DbId) -> String {
    let token = generate_access_token(user_id, "technician", &test_config().jwt)
        .expect("token generation");
    format!("Bearer {token}")
}

/// Issue a request against the app, optionally authenticated and with a
/// JSON body.
pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    user: Option<DbId>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(user_id) = user {
        builder = builder.header("authorization", bearer(user_id));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    app.clone().oneshot(request).await.expect("response")
}

/// Authenticated GET.
pub async fn get(app: &Router, path: &str, user: DbId) -> Response<Body> {
    request(app, Method::GET, path, Some(user), None).await
}

/// Authenticated POST with a JSON body.
pub async fn post_json(
    app: &Router,
    path: &str,
    user: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    request(app, Method::POST, path, Some(user), Some(body)).await
}

/// Authenticated POST with an empty body.
pub async fn post_empty(app: &Router, path: &str, user: DbId) -> Response<Body> {
    request(app, Method::POST, path, Some(user), None).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("valid JSON body")
}

/// Insert a user and return its id.
pub async fn seed_user(pool: &PgPool, username: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("seed user")
}

/// Insert a ticket owned by `owner` and return its id.
pub async fn seed_ticket(pool: &PgPool, code: &str, owner: DbId) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO tickets (code, title, owner_user_id) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(code)
    .bind(format!("Ticket {code}"))
    .bind(owner)
    .fetch_one(pool)
    .await
    .expect("seed ticket")
}
