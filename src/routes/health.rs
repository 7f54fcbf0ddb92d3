/**
 * Health Routes
 * Endpoints for checking backend health status
 */
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::db;
use crate::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

/// Initialize the server start time
pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

/// Simple health response
#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleHealthResponse {
    pub status: String,
}

/// Store reachability, reported as status strings rather than an error.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreHealthResponse {
    pub status: String,
    pub database: String,
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub database: ServiceCheck,
}

/// Detailed health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub environment: String,
    pub checks: HealthChecks,
}

/// GET /health - liveness ping
pub async fn health_ping() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /api/health - store reachability
pub async fn health_store(State(state): State<AppState>) -> Json<StoreHealthResponse> {
    let response = match state.store.ping().await {
        Ok(()) => StoreHealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        },
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            StoreHealthResponse {
                status: "unhealthy".to_string(),
                database: e.to_string(),
            }
        }
    };
    Json(response)
}

/// GET /api/health/detailed - uptime and store latency
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let database = match db::health_check(state.store.as_ref()).await {
        Ok(duration) => ServiceCheck {
            status: "healthy".to_string(),
            response_time: Some(duration.as_millis() as u64),
            error: None,
        },
        Err(e) => ServiceCheck {
            status: "unhealthy".to_string(),
            response_time: None,
            error: Some(e.to_string()),
        },
    };

    // The process answers even when the store is down
    Json(DetailedHealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
        environment: state.config.environment.clone(),
        checks: HealthChecks { database },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{
        Document, DocumentStore, Filter, FindOptions, StoreError,
    };
    use crate::test_support::TestApp;
    use async_trait::async_trait;
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Store whose every call fails, for the unhealthy paths.
    struct DownStore;

    #[async_trait]
    impl DocumentStore for DownStore {
        async fn find(&self, _: &str, _: &Filter, _: &FindOptions) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn find_one(&self, _: &str, _: &Filter) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn insert_one(&self, _: &str, _: Document) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn insert_many(&self, _: &str, _: Vec<Document>) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn update_one(&self, _: &str, _: &Filter, _: Document) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn delete_one(&self, _: &str, _: &Filter) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn count(&self, _: &str, _: &Filter) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn distinct(&self, _: &str, _: &str) -> Result<Vec<Value>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
    }

    fn down_router() -> Router {
        let healthy = TestApp::new();
        let state = AppState {
            store: Arc::new(DownStore),
            config: healthy.state.config.clone(),
        };
        Router::new()
            .route("/api/health", get(health_store))
            .route("/api/health/detailed", get(health_detailed))
            .route("/api/blog/posts", get(crate::routes::blog::list_posts))
            .with_state(state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let req = axum::http::Request::get(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_ping_returns_ok() {
        init_start_time();
        let app = TestApp::new();
        let (status, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_store_health_connected() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");

        let (status, body) = app.get("/api/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"]["status"], "healthy");
        assert!(body["uptime"].is_u64());
    }

    #[tokio::test]
    async fn test_store_down_reports_unhealthy_without_failing() {
        let (status, body) = get_json(down_router(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
        assert!(body["database"].as_str().unwrap().contains("connection refused"));

        let (status, body) = get_json(down_router(), "/api/health/detailed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["database"]["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_internal_error() {
        let (status, body) = get_json(down_router(), "/api/blog/posts").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
