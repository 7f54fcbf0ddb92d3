//! CMS Backend - library for app logic and testing

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;

#[cfg(test)]
mod test_support;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::store::DocumentStore;
use crate::routes::upload::MAX_UPLOAD_SIZE;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared handler state: the document store and process configuration.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
}

/// Configure CORS from the configured origin list.
/// `*` mirrors the caller's origin so credentialed requests keep working.
pub fn configure_cors(config: &AppConfig) -> CorsLayer {
    let allow_origin = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

fn api_routes() -> Router<AppState> {
    use routes::{auth, blog, cms, contact, faqs, health, menus, newsletter, pages, seed, testimonials, upload};

    Router::new()
        .route("/health", get(health::health_store))
        .route("/health/detailed", get(health::health_detailed))
        .route("/blog/posts", get(blog::list_posts).post(blog::create_post))
        .route("/blog/posts/slug/{slug}", get(blog::get_post_by_slug))
        .route(
            "/blog/posts/{id}",
            get(blog::get_post)
                .put(blog::update_post)
                .delete(blog::delete_post),
        )
        .route("/blog/categories", get(blog::list_categories))
        .route("/contact", post(contact::submit_message))
        .route("/contact/messages", get(contact::list_messages))
        .route("/contact/messages/{id}/read", put(contact::mark_read))
        .route("/newsletter/subscribe", post(newsletter::subscribe_email))
        .route("/newsletter/unsubscribe", post(newsletter::unsubscribe_email))
        .route("/newsletter/subscribers", get(newsletter::list_subscribers))
        .route("/pages", get(pages::list_pages).post(pages::create_page))
        .route("/pages/slug/{slug}", get(pages::get_page_by_slug))
        .route(
            "/pages/{id}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/menus", get(menus::list_menus).post(menus::create_menu))
        .route(
            "/menus/{name}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route("/cms/content", get(cms::list_content).post(cms::create_content))
        .route(
            "/cms/content/{key}",
            get(cms::get_content)
                .put(cms::update_content)
                .delete(cms::delete_content),
        )
        .route(
            "/testimonials",
            get(testimonials::list_testimonials).post(testimonials::create_testimonial),
        )
        .route(
            "/testimonials/{id}",
            get(testimonials::get_testimonial)
                .put(testimonials::update_testimonial)
                .delete(testimonials::delete_testimonial),
        )
        .route("/faqs", get(faqs::list_faqs).post(faqs::create_faq))
        .route(
            "/faqs/{id}",
            get(faqs::get_faq)
                .put(faqs::update_faq)
                .delete(faqs::delete_faq),
        )
        .route("/auth/login", post(auth::login))
        .route(
            "/media/upload",
            post(upload::upload_media).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        )
        .route("/media/{filename}", get(upload::serve_media))
        .route("/seed", post(seed::seed_initial_data))
        .route("/seed/pages-menus", post(seed::seed_pages_and_menus))
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);
    tracing::info!(origins = ?state.config.cors_origins, "CORS configured");

    Router::new()
        .route("/health", get(routes::health::health_ping))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        // Global cap sized for the largest accepted upload
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_SIZE + 1024 * 1024))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() -> Result<(), BoxError> {
    let config = AppConfig::from_env();

    // Held for the process lifetime; dropping them stops the log writers.
    let _log_guards = logging::init(&config);

    routes::health::init_start_time();

    if config.is_production() && config.uses_default_admin_credentials() {
        tracing::warn!(
            "SECURITY: CMS_ADMIN_USERNAME / CMS_ADMIN_PASSWORD are using insecure defaults. \
             Set both to strong values before exposing the admin login."
        );
    }

    let store = db::init_store(&config.database).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState {
        store,
        config: Arc::new(config),
    };
    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
