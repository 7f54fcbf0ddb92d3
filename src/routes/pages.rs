/**
 * Page Routes
 * Site pages composed of ordered sections
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{default_true, validate_slug, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{Localized, Page, Section, SectionInput, CREATED_AT};
use crate::db::normalize::{new_id, normalize_list, now, UpdateSet};
use crate::db::repository::Repository;
use crate::db::store::{DocumentStore, Filter, FindOptions, SortOrder};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageListQuery {
    #[serde(default = "default_true")]
    pub published_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    pub slug: String,
    pub title: Localized,
    pub meta_description: Option<Localized>,
    #[serde(default)]
    pub sections: Vec<Value>,
    #[serde(default = "default_true")]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageRequest {
    pub title: Option<Localized>,
    pub meta_description: Option<Localized>,
    /// Replaces the stored list wholesale when present.
    pub sections: Option<Vec<Value>>,
    pub published: Option<bool>,
}

fn build_sections(raw: Vec<Value>) -> Result<Vec<Section>, ApiError> {
    normalize_list::<SectionInput, Section>("sections", raw, Section::try_from)
}

/// Create a page with a generated identity. Pages created here are never
/// system pages.
pub async fn create(store: &dyn DocumentStore, payload: CreatePageRequest) -> Result<Page, ApiError> {
    let slug = payload.slug.trim().to_string();
    validate_slug(&slug)?;
    let sections = build_sections(payload.sections)?;

    let repo = Repository::<Page>::new(store);
    repo.ensure_unique("slug", &slug, "Slug already exists").await?;

    let stamp = now();
    let page = Page {
        id: new_id(),
        slug,
        title: payload.title,
        meta_description: payload.meta_description,
        sections,
        published: payload.published,
        is_system_page: false,
        created_at: stamp,
        updated_at: stamp,
    };
    repo.insert(&page).await?;
    Ok(page)
}

/// Delete by identity. A system page is refused even though it exists.
pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<(), ApiError> {
    let repo = Repository::<Page>::new(store);
    let filter = Filter::by("id", id);
    let page = repo.get(&filter).await?;
    if page.is_system_page {
        return Err(ApiError::Forbidden("System pages cannot be deleted".to_string()));
    }
    repo.delete(&filter).await
}

/// GET /api/pages
pub async fn list_pages(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageListQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<Page>>, ApiError> {
    let (skip, limit) = page.window(1000, 1000);
    let filter = if query.published_only {
        Filter::by("published", true)
    } else {
        Filter::new()
    };
    let pages = Repository::<Page>::new(state.store.as_ref())
        .list(
            &filter,
            &FindOptions::sorted(CREATED_AT, SortOrder::Descending).page(skip, limit),
        )
        .await?;
    Ok(Json(pages))
}

/// GET /api/pages/slug/{slug}
pub async fn get_page_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, ApiError> {
    let page = Repository::<Page>::new(state.store.as_ref())
        .get(&Filter::by("slug", slug))
        .await?;
    Ok(Json(page))
}

/// GET /api/pages/{id}
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Page>, ApiError> {
    let page = Repository::<Page>::new(state.store.as_ref())
        .get(&Filter::by("id", id))
        .await?;
    Ok(Json(page))
}

/// POST /api/pages
pub async fn create_page(
    State(state): State<AppState>,
    Payload(payload): Payload<CreatePageRequest>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    let page = create(state.store.as_ref(), payload).await?;
    tracing::info!(id = %page.id, slug = %page.slug, sections = page.sections.len(), "Page created");
    Ok((StatusCode::CREATED, Json(page)))
}

/// PUT /api/pages/{id}
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdatePageRequest>,
) -> Result<Json<Page>, ApiError> {
    let sections = payload.sections.map(build_sections).transpose()?;
    let set = UpdateSet::new()
        .set("title", payload.title)?
        .set("meta_description", payload.meta_description)?
        .set("sections", sections)?
        .set("published", payload.published)?;

    let page = Repository::<Page>::new(state.store.as_ref())
        .update(&Filter::by("id", id), set)
        .await?;
    Ok(Json(page))
}

/// DELETE /api/pages/{id}
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete(state.store.as_ref(), &id).await?;
    tracing::info!(id = %id, "Page deleted");
    Ok(MessageResponse::new("Page deleted successfully"))
}
