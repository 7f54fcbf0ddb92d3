/**
 * Routes Module
 * API route handlers and the request plumbing they share
 */
pub mod auth;
pub mod blog;
pub mod cms;
pub mod contact;
pub mod faqs;
pub mod health;
pub mod menus;
pub mod newsletter;
pub mod pages;
pub mod seed;
pub mod testimonials;
pub mod upload;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ApiError;

pub use crate::error::ErrorResponse;

/// Plain acknowledgement body (`{"message": "..."}`).
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// JSON body extractor whose rejections are reported as `InvalidInput`.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(ApiError::InvalidInput(rejection.body_text())),
        }
    }
}

/// Query string extractor whose rejections are reported as `InvalidInput`.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(invalid_query(rejection)),
        }
    }
}

fn invalid_query(rejection: QueryRejection) -> ApiError {
    ApiError::InvalidInput(rejection.body_text())
}

/// `limit`/`offset` query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// `(skip, limit)` with `limit` clamped to `[1, max]`.
    pub fn window(&self, default_limit: i64, max_limit: i64) -> (u64, i64) {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit);
        (self.offset.unwrap_or(0), limit)
    }
}

fn default_true() -> bool {
    true
}

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(
            "Slug must contain only lowercase letters, numbers, and hyphens".to_string(),
        ))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Trimmed value, or InvalidInput naming the field when blank.
pub fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_window_clamps() {
        let p = Pagination {
            limit: Some(500),
            offset: Some(20),
        };
        assert_eq!(p.window(10, 100), (20, 100));

        let p = Pagination {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(p.window(10, 100), (0, 1));

        assert_eq!(Pagination::default().window(50, 200), (0, 50));
    }

    #[test]
    fn test_slug_validation() {
        assert!(validate_slug("choosing-best-channel-manager").is_ok());
        assert!(validate_slug("About").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ana@example.hr"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("spaced name@example.com"));
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Ana ").unwrap(), "Ana");
        assert!(matches!(required("name", "   "), Err(ApiError::InvalidInput(_))));
    }
}
