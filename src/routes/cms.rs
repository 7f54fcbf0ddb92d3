/**
 * CMS Content Routes
 * Freeform content blocks addressed by a unique key
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{required, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{CmsContent, Content, ContentType};
use crate::db::normalize::{new_id, now, UpdateSet};
use crate::db::repository::Repository;
use crate::db::store::{Filter, FindOptions};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentListQuery {
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    pub content_type: ContentType,
    pub key: String,
    pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: Option<Content>,
}

/// GET /api/cms/content
pub async fn list_content(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ContentListQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<CmsContent>>, ApiError> {
    let (skip, limit) = page.window(1000, 1000);
    let filter = Filter::new().eq_opt("content_type", query.content_type.map(|t| t.as_str()));
    let items = Repository::<CmsContent>::new(state.store.as_ref())
        .list(&filter, &FindOptions::default().page(skip, limit))
        .await?;
    Ok(Json(items))
}

/// GET /api/cms/content/{key}
pub async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CmsContent>, ApiError> {
    let item = Repository::<CmsContent>::new(state.store.as_ref())
        .get(&Filter::by("key", key))
        .await?;
    Ok(Json(item))
}

/// POST /api/cms/content
pub async fn create_content(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateContentRequest>,
) -> Result<(StatusCode, Json<CmsContent>), ApiError> {
    let key = required("key", &payload.key)?;
    let repo = Repository::<CmsContent>::new(state.store.as_ref());
    repo.ensure_unique("key", &key, "Content with this key already exists")
        .await?;

    let stamp = now();
    let item = CmsContent {
        id: new_id(),
        content_type: payload.content_type,
        key,
        content: payload.content,
        created_at: stamp,
        updated_at: stamp,
    };
    repo.insert(&item).await?;

    tracing::info!(key = %item.key, content_type = item.content_type.as_str(), "CMS content created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/cms/content/{key}
pub async fn update_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Payload(payload): Payload<UpdateContentRequest>,
) -> Result<Json<CmsContent>, ApiError> {
    let item = Repository::<CmsContent>::new(state.store.as_ref())
        .update(
            &Filter::by("key", key),
            UpdateSet::new().set("content", payload.content)?,
        )
        .await?;
    Ok(Json(item))
}

/// DELETE /api/cms/content/{key}
pub async fn delete_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Repository::<CmsContent>::new(state.store.as_ref())
        .delete(&Filter::by("key", key.as_str()))
        .await?;
    tracing::info!(key = %key, "CMS content deleted");
    Ok(MessageResponse::new("Content deleted successfully"))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_content_lifecycle_by_key() {
        let app = TestApp::new();
        let (status, created) = app
            .post(
                "/api/cms/content",
                json!({
                    "content_type": "section",
                    "key": "hero",
                    "content": {"heading": {"en": "Welcome", "de": "Willkommen"}}
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app
            .post(
                "/api/cms/content",
                json!({"content_type": "page", "key": "hero", "content": {}}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Content with this key already exists");

        let (status, updated) = app
            .put("/api/cms/content/hero", json!({"content": {"heading": {"en": "Hello"}}}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["content"]["heading"]["en"], "Hello");
        assert_eq!(updated["content_type"], "section");
        assert_eq!(updated["created_at"], created["created_at"]);

        let (status, _) = app.delete("/api/cms/content/hero").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = app.get("/api/cms/content/hero").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Content not found");
    }

    #[tokio::test]
    async fn test_list_filters_by_type_and_rejects_unknown_type() {
        let app = TestApp::new();
        for (key, kind) in [("a", "faq"), ("b", "pricing"), ("c", "faq")] {
            app.post(
                "/api/cms/content",
                json!({"content_type": kind, "key": key, "content": {}}),
            )
            .await;
        }
        let (_, faqs) = app.get("/api/cms/content?content_type=faq").await;
        assert_eq!(faqs.as_array().unwrap().len(), 2);

        let (status, _) = app
            .post(
                "/api/cms/content",
                json!({"content_type": "blog", "key": "d", "content": {}}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
