/**
 * FAQ Routes
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{default_true, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{Faq, Localized, DEFAULT_FAQ_CATEGORY};
use crate::db::normalize::{new_id, now, UpdateSet};
use crate::db::repository::Repository;
use crate::db::store::{Filter, FindOptions, SortOrder};
use crate::error::ApiError;
use crate::AppState;

const SEARCH_FIELDS: [&str; 6] = [
    "question.en",
    "question.hr",
    "question.de",
    "answer.en",
    "answer.hr",
    "answer.de",
];

#[derive(Debug, Deserialize)]
pub struct FaqListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_true")]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub question: Localized,
    pub answer: Localized,
    pub category: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<Localized>,
    pub answer: Option<Localized>,
    pub category: Option<String>,
    pub order: Option<i64>,
    pub active: Option<bool>,
}

/// GET /api/faqs
pub async fn list_faqs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FaqListQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<Faq>>, ApiError> {
    let (skip, limit) = page.window(100, 100);
    let mut filter = Filter::new()
        .eq_opt("category", query.category.filter(|c| !c.is_empty()))
        .search(&SEARCH_FIELDS, query.search.as_deref());
    if query.active_only {
        filter = filter.eq("active", true);
    }

    let faqs = Repository::<Faq>::new(state.store.as_ref())
        .list(
            &filter,
            &FindOptions::sorted("order", SortOrder::Ascending).page(skip, limit),
        )
        .await?;
    Ok(Json(faqs))
}

/// GET /api/faqs/{id}
pub async fn get_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Faq>, ApiError> {
    let faq = Repository::<Faq>::new(state.store.as_ref())
        .get(&Filter::by("id", id))
        .await?;
    Ok(Json(faq))
}

/// POST /api/faqs
pub async fn create_faq(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateFaqRequest>,
) -> Result<(StatusCode, Json<Faq>), ApiError> {
    let stamp = now();
    let faq = Faq {
        id: new_id(),
        question: payload.question,
        answer: payload.answer,
        category: payload
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_FAQ_CATEGORY.to_string()),
        order: payload.order,
        active: payload.active,
        created_at: stamp,
        updated_at: stamp,
    };
    Repository::<Faq>::new(state.store.as_ref()).insert(&faq).await?;

    tracing::info!(id = %faq.id, category = %faq.category, "FAQ created");
    Ok((StatusCode::CREATED, Json(faq)))
}

/// PUT /api/faqs/{id}
pub async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateFaqRequest>,
) -> Result<Json<Faq>, ApiError> {
    let set = UpdateSet::new()
        .set("question", payload.question)?
        .set("answer", payload.answer)?
        .set("category", payload.category)?
        .set("order", payload.order)?
        .set("active", payload.active)?;

    let faq = Repository::<Faq>::new(state.store.as_ref())
        .update(&Filter::by("id", id), set)
        .await?;
    Ok(Json(faq))
}

/// DELETE /api/faqs/{id}
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Repository::<Faq>::new(state.store.as_ref())
        .delete(&Filter::by("id", id.as_str()))
        .await?;
    tracing::info!(id = %id, "FAQ deleted");
    Ok(MessageResponse::new("FAQ deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_FAQ_CATEGORY;
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_faq_defaults_filters_and_search() {
        let app = TestApp::new();
        let (status, created) = app
            .post(
                "/api/faqs",
                json!({"question": {"en": "How do I sync calendars?"}, "answer": {"en": "Via iCal."}}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["category"], DEFAULT_FAQ_CATEGORY);
        assert_eq!(created["active"], true);

        app.post(
            "/api/faqs",
            json!({
                "question": {"en": "What does it cost?"},
                "answer": {"hr": "Cijena ovisi o broju jedinica."},
                "category": "billing",
                "order": 1
            }),
        )
        .await;
        app.post(
            "/api/faqs",
            json!({"question": {"en": "Old question"}, "answer": {"en": "x"}, "active": false}),
        )
        .await;

        let (_, billing) = app.get("/api/faqs?category=billing").await;
        assert_eq!(billing.as_array().unwrap().len(), 1);

        let (_, found) = app.get("/api/faqs?search=CIJENA").await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["category"], "billing");

        let (_, active) = app.get("/api/faqs").await;
        assert_eq!(active.as_array().unwrap().len(), 2);
        let (_, all) = app.get("/api/faqs?active_only=false").await;
        assert_eq!(all.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_faq_update_missing_is_not_found() {
        let app = TestApp::new();
        let (status, body) = app.put("/api/faqs/nope", json!({"order": 2})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "FAQ not found");
    }
}
