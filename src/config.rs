//! Process configuration read from the environment (and `.env`).

use std::path::PathBuf;

use crate::db::DbConfig;

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub database: DbConfig,
    pub admin_username: String,
    pub admin_password: String,
    /// Allowed CORS origins; `*` mirrors the caller's origin.
    pub cors_origins: Vec<String>,
    /// Directory uploaded media is written to and served from.
    pub media_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8001),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            database: DbConfig::default(),
            admin_username: std::env::var("CMS_ADMIN_USERNAME")
                .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: std::env::var("CMS_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS")
                    .or_else(|_| std::env::var("ALLOWED_ORIGINS"))
                    .unwrap_or_else(|_| "*".to_string()),
            ),
            media_root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::default()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_default_admin_credentials(&self) -> bool {
        self.admin_username == DEFAULT_ADMIN_USERNAME
            || self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}
