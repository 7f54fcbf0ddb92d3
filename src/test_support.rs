//! Router harness for handler tests: in-memory store, temporary media root.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::db::memory::MemoryStore;
use crate::{create_app, AppState};

pub const TEST_ADMIN_USERNAME: &str = "editor";
pub const TEST_ADMIN_PASSWORD: &str = "s3cret-pass";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _media: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let media = tempfile::tempdir().unwrap();
        let config = AppConfig {
            admin_username: TEST_ADMIN_USERNAME.to_string(),
            admin_password: TEST_ADMIN_PASSWORD.to_string(),
            cors_origins: vec!["*".to_string()],
            media_root: media.path().join("media"),
            ..AppConfig::default()
        };
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(config),
        };
        Self {
            router: create_app(state.clone()),
            state,
            _media: media,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}
