#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use formkit_api::auth::jwt::JwtConfig;
use formkit_api::config::ServerConfig;
use formkit_api::router::build_app_router;
use formkit_api::state::AppState;
use formkit_core::assets::AssetStore;
use formkit_core::short_id::ShortIdCodec;
use formkit_db::models::user::CreateUser;
use formkit_db::repositories::UserRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_APP_URL: &str = "https://forms.test";
pub const TEST_SALT: &str = "test-salt";

/// Asset store answering from a fixed set of paths.
pub struct StaticAssets(pub HashSet<String>);

impl AssetStore for StaticAssets {
    fn exists(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        app_url: TEST_APP_URL.to_string(),
        asset_root: "unused".to_string(),
        public_id_salt: TEST_SALT.to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router over `pool`, with `existing_assets`
/// reported as present.
pub fn build_test_app_with_assets(pool: PgPool, existing_assets: &[&str]) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        short_ids: Arc::new(ShortIdCodec::new(&config.public_id_salt)),
        config: Arc::new(config),
        assets: Arc::new(StaticAssets(
            existing_assets.iter().map(|s| s.to_string()).collect(),
        )),
    };
    build_app_router(state)
}

/// Build the full application router over `pool` with no stored assets.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_assets(pool, &[])
}

/// Insert a user and return `(user_id, bearer token)`.
pub async fn create_user(pool: &PgPool, email: &str) -> (i64, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Test Owner".to_string(),
            email: email.to_string(),
            company_name: Some("Acme".to_string()),
            privacy_link: Some("https://acme.test/privacy".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let token = test_config().jwt.issue(user.id).unwrap();
    (user.id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request("POST", uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("POST", uri, body, Some(token))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("POST", uri, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("PUT", uri, body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("DELETE", uri, Some(token))).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
