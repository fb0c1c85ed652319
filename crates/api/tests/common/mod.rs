#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use mediavault_core::media::access::DefaultAccessPolicy;
use mediavault_core::media::bundle::MediaBundle;
use mediavault_core::media::memory::InMemoryStorage;
use mediavault_core::media::plugin::PluginRegistry;
use tower::ServiceExt;

use mediavault_api::auth::jwt::{generate_access_token, JwtConfig};
use mediavault_api::config::{MediaConfig, ServerConfig, DEFAULT_THUMBNAIL};
use mediavault_api::router::build_app_router;
use mediavault_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        media: MediaConfig {
            default_thumbnail: DEFAULT_THUMBNAIL.to_string(),
        },
    }
}

/// Bundles available in every test app.
pub fn test_bundles() -> Vec<MediaBundle> {
    vec![
        MediaBundle::new("document", "Document", "generic").with_fields(&["file"]),
        MediaBundle::new("image", "Image", "image")
            .with_fields(&["image", "mime_type"])
            .map_field("filename", "name")
            .map_field("mime", "mime_type"),
    ]
}

/// A test app over in-memory storage. The storage handle is returned so
/// tests can inspect it or inject failures.
pub fn build_test_app() -> (Router, Arc<InMemoryStorage>) {
    let config = test_config();
    let storage = Arc::new(InMemoryStorage::with_bundles(test_bundles()));

    let state = AppState {
        storage: storage.clone(),
        registry: Arc::new(PluginRegistry::with_builtin(&config.media.default_thumbnail)),
        access: Arc::new(DefaultAccessPolicy),
        config: Arc::new(config.clone()),
    };

    (build_app_router(state, &config), storage)
}

/// A bearer token for `user_id` with `role`.
pub fn token(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<String>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

async fn with_json(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    with_json(app, Method::POST, uri, token, body).await
}

pub async fn put_json(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    with_json(app, Method::PUT, uri, token, body).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
