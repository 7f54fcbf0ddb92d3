/**
 * Menu Routes
 * Navigation menus addressed by name (header, mobile, footer, ...)
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{required, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{Menu, MenuItem, MenuItemInput, CREATED_AT};
use crate::db::normalize::{new_id, normalize_list, now, UpdateSet};
use crate::db::repository::Repository;
use crate::db::store::{Filter, FindOptions, SortOrder};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    pub items: Option<Vec<Value>>,
}

pub(crate) fn build_items(raw: Vec<Value>) -> Result<Vec<MenuItem>, ApiError> {
    normalize_list::<MenuItemInput, MenuItem>("items", raw, |input| Ok(MenuItem::from(input)))
}

/// GET /api/menus - oldest first
pub async fn list_menus(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<Menu>>, ApiError> {
    let (skip, limit) = page.window(100, 100);
    let menus = Repository::<Menu>::new(state.store.as_ref())
        .list(
            &Filter::new(),
            &FindOptions::sorted(CREATED_AT, SortOrder::Ascending).page(skip, limit),
        )
        .await?;
    Ok(Json(menus))
}

/// GET /api/menus/{name}
pub async fn get_menu(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Menu>, ApiError> {
    let menu = Repository::<Menu>::new(state.store.as_ref())
        .get(&Filter::by("name", name))
        .await?;
    Ok(Json(menu))
}

/// POST /api/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateMenuRequest>,
) -> Result<(StatusCode, Json<Menu>), ApiError> {
    let name = required("name", &payload.name)?;
    let items = build_items(payload.items)?;

    let repo = Repository::<Menu>::new(state.store.as_ref());
    repo.ensure_unique("name", &name, "Menu with this name already exists")
        .await?;

    let stamp = now();
    let menu = Menu {
        id: new_id(),
        name,
        items,
        created_at: stamp,
        updated_at: stamp,
    };
    repo.insert(&menu).await?;

    tracing::info!(id = %menu.id, name = %menu.name, items = menu.items.len(), "Menu created");
    Ok((StatusCode::CREATED, Json(menu)))
}

/// PUT /api/menus/{name} - replaces the item list when given
pub async fn update_menu(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Payload(payload): Payload<UpdateMenuRequest>,
) -> Result<Json<Menu>, ApiError> {
    let items = payload.items.map(build_items).transpose()?;
    let menu = Repository::<Menu>::new(state.store.as_ref())
        .update(&Filter::by("name", name), UpdateSet::new().set("items", items)?)
        .await?;
    Ok(Json(menu))
}

/// DELETE /api/menus/{name}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Repository::<Menu>::new(state.store.as_ref())
        .delete(&Filter::by("name", name.as_str()))
        .await?;
    tracing::info!(name = %name, "Menu deleted");
    Ok(MessageResponse::new("Menu deleted successfully"))
}
