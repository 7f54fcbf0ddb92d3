/**
 * Auth Routes
 * Admin login against the configured credentials
 */
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::Payload;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
}

fn credentials_match(config: &AppConfig, username: &str, password: &str) -> bool {
    config.admin_username == username && config.admin_password == password
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    if !credentials_match(&state.config, &payload.username, &payload.password) {
        tracing::warn!(username = %payload.username, "Failed login attempt");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    tracing::info!(username = %payload.username, "Admin logged in");
    Ok(Json(LoginResponse { success: true }))
}
