/**
 * Testimonial Routes
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{default_true, required, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{Localized, Testimonial};
use crate::db::normalize::{new_id, now, UpdateSet};
use crate::db::repository::Repository;
use crate::db::store::{Filter, FindOptions, SortOrder};
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    #[serde(default = "default_true")]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateTestimonialRequest {
    pub name: String,
    pub company: String,
    pub location: String,
    pub text: Localized,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTestimonialRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub text: Option<Localized>,
    pub avatar_url: Option<String>,
    pub order: Option<i64>,
    pub active: Option<bool>,
}

/// GET /api/testimonials - by display order
pub async fn list_testimonials(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ActiveQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    let (skip, limit) = page.window(100, 100);
    let filter = if query.active_only {
        Filter::by("active", true)
    } else {
        Filter::new()
    };
    let items = Repository::<Testimonial>::new(state.store.as_ref())
        .list(
            &filter,
            &FindOptions::sorted("order", SortOrder::Ascending).page(skip, limit),
        )
        .await?;
    Ok(Json(items))
}

/// GET /api/testimonials/{id}
pub async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Testimonial>, ApiError> {
    let item = Repository::<Testimonial>::new(state.store.as_ref())
        .get(&Filter::by("id", id))
        .await?;
    Ok(Json(item))
}

/// POST /api/testimonials
pub async fn create_testimonial(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateTestimonialRequest>,
) -> Result<(StatusCode, Json<Testimonial>), ApiError> {
    let stamp = now();
    let item = Testimonial {
        id: new_id(),
        name: required("name", &payload.name)?,
        company: payload.company,
        location: payload.location,
        text: payload.text,
        avatar_url: payload.avatar_url,
        order: payload.order,
        active: payload.active,
        created_at: stamp,
        updated_at: stamp,
    };
    Repository::<Testimonial>::new(state.store.as_ref())
        .insert(&item)
        .await?;

    tracing::info!(id = %item.id, name = %item.name, "Testimonial created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/testimonials/{id}
pub async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateTestimonialRequest>,
) -> Result<Json<Testimonial>, ApiError> {
    let set = UpdateSet::new()
        .set("name", payload.name)?
        .set("company", payload.company)?
        .set("location", payload.location)?
        .set("text", payload.text)?
        .set("avatar_url", payload.avatar_url)?
        .set("order", payload.order)?
        .set("active", payload.active)?;

    let item = Repository::<Testimonial>::new(state.store.as_ref())
        .update(&Filter::by("id", id), set)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/testimonials/{id}
pub async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Repository::<Testimonial>::new(state.store.as_ref())
        .delete(&Filter::by("id", id.as_str()))
        .await?;
    tracing::info!(id = %id, "Testimonial deleted");
    Ok(MessageResponse::new("Testimonial deleted successfully"))
}

#[cfg(test)]
mod tests {
    use crate::db::store::DocumentStore;
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn body(name: &str, order: i64, active: bool) -> Value {
        json!({
            "name": name,
            "company": "Apartments Adria",
            "location": "Split, Croatia",
            "text": {"en": "Great tool"},
            "order": order,
            "active": active
        })
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_active_only_by_default() {
        let app = TestApp::new();
        app.post("/api/testimonials", body("Ivana", 2, true)).await;
        app.post("/api/testimonials", body("Marko", 1, true)).await;
        app.post("/api/testimonials", body("Hidden", 0, false)).await;

        let (_, active) = app.get("/api/testimonials").await;
        let names: Vec<&str> = active
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Marko", "Ivana"]);

        let (_, all) = app.get("/api/testimonials?active_only=false").await;
        assert_eq!(all.as_array().unwrap().len(), 3);
        assert_eq!(all[0]["name"], "Hidden");
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let app = TestApp::new();
        let (status, created) = app.post("/api/testimonials", body("Ivana", 0, true)).await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/testimonials/{}", created["id"].as_str().unwrap());

        let (status, updated) = app.put(&uri, json!({"order": 7, "avatar_url": null})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["order"], 7);
        assert_eq!(updated["company"], "Apartments Adria");
        assert!(updated["updated_at"].as_str().unwrap() > created["updated_at"].as_str().unwrap());

        let (status, body) = app.delete(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Testimonial deleted successfully");
        let (status, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Testimonial not found");
    }

    #[tokio::test]
    async fn test_records_without_updated_at_still_read() {
        let app = TestApp::new();
        let legacy = json!({
            "id": "t1",
            "name": "Legacy",
            "company": "Villa Mare",
            "location": "Hvar, Croatia",
            "text": {"en": "Imported before edits were tracked"},
            "order": 0,
            "active": true,
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        });
        let Value::Object(doc) = legacy else { unreachable!() };
        app.state.store.insert_one("testimonials", doc).await.unwrap();

        let (status, list) = app.get("/api/testimonials").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["id"], "t1");
        assert_eq!(list[0]["updated_at"], "2024-05-01T10:00:00.123456Z");

        let (status, one) = app.get("/api/testimonials/t1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(one["updated_at"], one["created_at"]);

        let (status, updated) = app.put("/api/testimonials/t1", json!({"order": 3})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["updated_at"].as_str().unwrap() > updated["created_at"].as_str().unwrap());
    }
}
