/**
 * Blog Routes
 * CRUD API endpoints for blog posts
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::{validate_slug, MessageResponse, Pagination, Payload, QueryParams};
use crate::db::models::{BlogPost, BlogStatus, Localized, CREATED_AT, DEFAULT_AUTHOR};
use crate::db::normalize::{new_id, now, UpdateSet};
use crate::db::repository::{Entity, Repository};
use crate::db::store::{Filter, FindOptions, SortOrder};
use crate::error::ApiError;
use crate::AppState;

const SEARCH_FIELDS: [&str; 4] = ["title.en", "title.hr", "title.de", "content.en"];

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for GET /api/blog/posts
#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
    pub status: Option<BlogStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Request body for POST /api/blog/posts
#[derive(Debug, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Localized,
    pub slug: String,
    pub excerpt: Localized,
    pub content: Localized,
    pub category: String,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: BlogStatus,
    pub author: Option<String>,
}

/// Request body for PUT /api/blog/posts/{id}. The slug cannot be changed.
#[derive(Debug, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<Localized>,
    pub excerpt: Option<Localized>,
    pub content: Option<Localized>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<BlogStatus>,
    pub author: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

// ============================================================================
// Validation
// ============================================================================

/// Sanitize HTML content using ammonia
fn sanitize_content(content: Localized) -> Localized {
    content
        .into_iter()
        .map(|(lang, html)| (lang, ammonia::clean(&html)))
        .collect()
}

/// Trim tags, drop blanks and repeats, keep first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|t: &String| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/blog/posts - List blog posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<BlogListQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let (skip, limit) = page.window(10, 100);
    let filter = Filter::new()
        .eq_opt("status", query.status.map(|s| s.as_str()))
        .eq_opt("category", query.category.filter(|c| !c.is_empty()))
        .search(&SEARCH_FIELDS, query.search.as_deref());

    let posts = Repository::<BlogPost>::new(state.store.as_ref())
        .list(
            &filter,
            &FindOptions::sorted(CREATED_AT, SortOrder::Descending).page(skip, limit),
        )
        .await?;
    Ok(Json(posts))
}

/// GET /api/blog/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = Repository::<BlogPost>::new(state.store.as_ref())
        .get(&Filter::by("id", id))
        .await?;
    Ok(Json(post))
}

/// GET /api/blog/posts/slug/{slug}
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = Repository::<BlogPost>::new(state.store.as_ref())
        .get(&Filter::by("slug", slug))
        .await?;
    Ok(Json(post))
}

/// POST /api/blog/posts - Create new blog post
pub async fn create_post(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateBlogRequest>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let slug = payload.slug.trim().to_string();
    validate_slug(&slug)?;
    let category = super::required("category", &payload.category)?;

    let repo = Repository::<BlogPost>::new(state.store.as_ref());
    repo.ensure_unique("slug", &slug, "Slug already exists").await?;

    let stamp = now();
    let post = BlogPost {
        id: new_id(),
        title: payload.title,
        slug,
        excerpt: payload.excerpt,
        content: sanitize_content(payload.content),
        category,
        featured_image: payload.featured_image,
        tags: normalize_tags(payload.tags),
        status: payload.status,
        author: payload
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        created_at: stamp,
        updated_at: stamp,
    };
    repo.insert(&post).await?;

    tracing::info!(id = %post.id, slug = %post.slug, status = post.status.as_str(), "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blog/posts/{id} - Partial update
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateBlogRequest>,
) -> Result<Json<BlogPost>, ApiError> {
    let set = UpdateSet::new()
        .set("title", payload.title)?
        .set("excerpt", payload.excerpt)?
        .set("content", payload.content.map(sanitize_content))?
        .set("category", payload.category)?
        .set("featured_image", payload.featured_image)?
        .set("tags", payload.tags.map(normalize_tags))?
        .set("status", payload.status)?
        .set("author", payload.author)?;

    let post = Repository::<BlogPost>::new(state.store.as_ref())
        .update(&Filter::by("id", id), set)
        .await?;
    Ok(Json(post))
}

/// DELETE /api/blog/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Repository::<BlogPost>::new(state.store.as_ref())
        .delete(&Filter::by("id", id.as_str()))
        .await?;
    tracing::info!(id = %id, "Blog post deleted");
    Ok(MessageResponse::new("Blog post deleted successfully"))
}

/// GET /api/blog/categories - Distinct categories in use
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state
        .store
        .distinct(BlogPost::COLLECTION, "category")
        .await?
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect();
    Ok(Json(CategoriesResponse { categories }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    fn post_body(slug: &str, category: &str) -> Value {
        json!({
            "title": {"en": format!("Post {slug}"), "hr": "Objava"},
            "slug": slug,
            "excerpt": {"en": "Short"},
            "content": {"en": "<p>Hello</p><script>alert(1)</script>"},
            "category": category,
            "tags": ["ota", "ota", " pricing "]
        })
    }

    #[test]
    fn test_normalize_tags_dedupes_in_order() {
        let tags = normalize_tags(vec!["b".into(), "a".into(), "b".into(), " ".into()]);
        assert_eq!(tags, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_create_post_applies_defaults_and_sanitizes() {
        let app = TestApp::new();
        let (status, body) = app.post("/api/blog/posts", post_body("first-post", "news")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "draft");
        assert_eq!(body["author"], DEFAULT_AUTHOR);
        assert_eq!(body["tags"], json!(["ota", "pricing"]));
        assert!(!body["content"]["en"].as_str().unwrap().contains("<script>"));
        assert_eq!(body["created_at"], body["updated_at"]);

        let id = body["id"].as_str().unwrap();
        let (status, fetched) = app.get(&format!("/api/blog/posts/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, body);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected_without_insert() {
        let app = TestApp::new();
        app.post("/api/blog/posts", post_body("same", "news")).await;
        let (status, body) = app.post("/api/blog/posts", post_body("same", "tips")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Slug already exists");

        let (_, posts) = app.get("/api/blog/posts").await;
        assert_eq!(posts.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_slug_and_missing_fields() {
        let app = TestApp::new();
        let (status, _) = app.post("/api/blog/posts", post_body("Not A Slug", "news")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .post("/api/blog/posts", json!({"title": {"en": "x"}, "slug": "x"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let app = TestApp::new();
        let (_, created) = app.post("/api/blog/posts", post_body("updatable", "news")).await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = app
            .put(
                &format!("/api/blog/posts/{id}"),
                json!({"status": "published", "category": null, "slug": "ignored"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "published");
        assert_eq!(updated["category"], "news");
        assert_eq!(updated["slug"], "updatable");
        assert_eq!(updated["title"], created["title"]);
        assert!(updated["updated_at"].as_str().unwrap() > created["updated_at"].as_str().unwrap());

        let (status, _) = app.put("/api/blog/posts/missing", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_filters_search_and_pagination() {
        let app = TestApp::new();
        for (slug, category) in [("a-one", "news"), ("b-two", "tips"), ("c-three", "news"), ("d-four", "news")] {
            let (status, _) = app.post("/api/blog/posts", post_body(slug, category)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, news) = app.get("/api/blog/posts?category=news").await;
        assert_eq!(news.as_array().unwrap().len(), 3);

        let (_, found) = app.get("/api/blog/posts?search=POST%20B-TWO").await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["slug"], "b-two");

        let (_, first) = app.get("/api/blog/posts?limit=2&offset=0").await;
        let (_, second) = app.get("/api/blog/posts?limit=2&offset=2").await;
        let slugs: Vec<&str> = first
            .as_array()
            .unwrap()
            .iter()
            .chain(second.as_array().unwrap())
            .map(|p| p["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["d-four", "c-three", "b-two", "a-one"]);

        let (_, published) = app.get("/api/blog/posts?status=published").await;
        assert!(published.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slug_lookup_delete_and_categories() {
        let app = TestApp::new();
        let (_, created) = app.post("/api/blog/posts", post_body("to-delete", "news")).await;
        app.post("/api/blog/posts", post_body("kept", "tips")).await;

        let (status, by_slug) = app.get("/api/blog/posts/slug/to-delete").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_slug["id"], created["id"]);

        let (_, cats) = app.get("/api/blog/categories").await;
        let mut cats: Vec<String> = serde_json::from_value(cats["categories"].clone()).unwrap();
        cats.sort();
        assert_eq!(cats, vec!["news", "tips"]);

        let id = created["id"].as_str().unwrap();
        let (status, body) = app.delete(&format!("/api/blog/posts/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Blog post deleted successfully");

        let (status, body) = app.get(&format!("/api/blog/posts/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Blog post not found");
        let (status, _) = app.delete(&format!("/api/blog/posts/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_query_string_is_json_bad_request() {
        let app = TestApp::new();
        let (status, body) = app.get("/api/blog/posts?status=archived").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("archived"));

        let (status, body) = app.get("/api/blog/posts?limit=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
