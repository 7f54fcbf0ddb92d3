/**
 * Newsletter Routes
 * Subscriptions are soft-deleted; subscribing again reactivates the record.
 */
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{default_true, is_valid_email, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::NewsletterSubscription;
use crate::db::normalize::{new_id, now, UpdateSet};
use crate::db::repository::Repository;
use crate::db::store::{DocumentStore, Filter, FindOptions};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscriberQuery {
    #[serde(default = "default_true")]
    pub active_only: bool,
}

#[derive(Debug, Serialize)]
pub struct SubscribersResponse {
    pub subscribers: Vec<NewsletterSubscription>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
    Reactivated,
}

impl SubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Subscribed => "Successfully subscribed",
            SubscribeOutcome::AlreadySubscribed => "Already subscribed",
            SubscribeOutcome::Reactivated => "Subscription reactivated",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SubscribeOutcome::Subscribed => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }
}

fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(email)
}

pub async fn subscribe(store: &dyn DocumentStore, raw_email: &str) -> Result<SubscribeOutcome, ApiError> {
    let email = normalize_email(raw_email)?;
    let repo = Repository::<NewsletterSubscription>::new(store);
    let filter = Filter::by("email", email.as_str());

    match repo.find(&filter).await? {
        Some(existing) if existing.active => Ok(SubscribeOutcome::AlreadySubscribed),
        Some(_) => {
            repo.update(&filter, UpdateSet::new().set("active", Some(true))?)
                .await?;
            Ok(SubscribeOutcome::Reactivated)
        }
        None => {
            repo.insert(&NewsletterSubscription {
                id: new_id(),
                email,
                subscribed_at: now(),
                active: true,
            })
            .await?;
            Ok(SubscribeOutcome::Subscribed)
        }
    }
}

pub async fn unsubscribe(store: &dyn DocumentStore, raw_email: &str) -> Result<(), ApiError> {
    let email = normalize_email(raw_email)?;
    Repository::<NewsletterSubscription>::new(store)
        .update(
            &Filter::by("email", email),
            UpdateSet::new().set("active", Some(false))?,
        )
        .await
        .map(|_| ())
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound("Email not found".to_string()),
            other => other,
        })
}

/// POST /api/newsletter/subscribe
pub async fn subscribe_email(
    State(state): State<AppState>,
    Payload(payload): Payload<EmailRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let outcome = subscribe(state.store.as_ref(), &payload.email).await?;
    tracing::info!(outcome = ?outcome, "Newsletter subscribe");
    Ok((outcome.status(), MessageResponse::new(outcome.message())))
}

/// POST /api/newsletter/unsubscribe
pub async fn unsubscribe_email(
    State(state): State<AppState>,
    Payload(payload): Payload<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    unsubscribe(state.store.as_ref(), &payload.email).await?;
    tracing::info!("Newsletter unsubscribe");
    Ok(MessageResponse::new("Successfully unsubscribed"))
}

/// GET /api/newsletter/subscribers
pub async fn list_subscribers(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SubscriberQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<SubscribersResponse>, ApiError> {
    let (skip, limit) = page.window(10_000, 10_000);
    let filter = if query.active_only {
        Filter::by("active", true)
    } else {
        Filter::new()
    };
    let subscribers = Repository::<NewsletterSubscription>::new(state.store.as_ref())
        .list(&filter, &FindOptions::default().page(skip, limit))
        .await?;
    let count = subscribers.len();
    Ok(Json(SubscribersResponse { subscribers, count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::test_support::TestApp;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribe_twice_unsubscribe_resubscribe_keeps_identity() {
        let store = MemoryStore::new();
        let repo = Repository::<NewsletterSubscription>::new(&store);

        assert_eq!(subscribe(&store, "Guest@Example.com ").await.unwrap(), SubscribeOutcome::Subscribed);
        let original = repo.get(&Filter::by("email", "guest@example.com")).await.unwrap();

        assert_eq!(
            subscribe(&store, "guest@example.com").await.unwrap(),
            SubscribeOutcome::AlreadySubscribed
        );
        assert_eq!(repo.count(&Filter::new()).await.unwrap(), 1);

        unsubscribe(&store, "guest@example.com").await.unwrap();
        assert!(!repo.get(&Filter::by("id", original.id.as_str())).await.unwrap().active);

        assert_eq!(
            subscribe(&store, "guest@example.com").await.unwrap(),
            SubscribeOutcome::Reactivated
        );
        let again = repo.get(&Filter::by("email", "guest@example.com")).await.unwrap();
        assert_eq!(again.id, original.id);
        assert!(again.active);
        assert_eq!(repo.count(&Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_email_is_not_found() {
        let store = MemoryStore::new();
        let err = unsubscribe(&store, "nobody@example.com").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "Email not found"));
    }

    #[tokio::test]
    async fn test_http_status_codes_and_listing() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/newsletter/subscribe", json!({"email": "a@example.com"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Successfully subscribed");

        let (status, body) = app
            .post("/api/newsletter/subscribe", json!({"email": "a@example.com"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Already subscribed");

        app.post("/api/newsletter/subscribe", json!({"email": "b@example.com"}))
            .await;
        let (status, _) = app
            .post("/api/newsletter/unsubscribe", json!({"email": "b@example.com"}))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, active) = app.get("/api/newsletter/subscribers").await;
        assert_eq!(active["count"], 1);
        let (_, all) = app.get("/api/newsletter/subscribers?active_only=false").await;
        assert_eq!(all["count"], 2);
        assert_eq!(all["subscribers"].as_array().unwrap().len(), 2);

        let (status, _) = app
            .post("/api/newsletter/subscribe", json!({"email": "broken"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
