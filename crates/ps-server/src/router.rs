//! Axum router construction.
//!
//! Builds the application router with the image routes, middleware layers,
//! and static page serving.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::routes;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Leave room for multipart framing around the file itself.
    let body_limit = ctx.config.server.max_upload_bytes.saturating_add(64 * 1024);

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/version", get(routes::version::version))
        .route(
            "/images",
            get(routes::images::list_images).post(routes::images::create_image),
        )
        .route(
            "/images/:name",
            get(routes::images::get_image)
                .patch(routes::images::update_image)
                .delete(routes::images::delete_image),
        )
        .route("/api/images", get(routes::images::list_images_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    match static_dir {
        Some(dir) if dir.exists() => {
            tracing::info!("Serving static files from {:?}", dir);
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir).append_index_html_on_directories(true),
            );
        }
        Some(dir) => {
            tracing::warn!(
                "Static directory {:?} does not exist; serving embedded pages",
                dir
            );
            app = app.fallback(routes::assets::embedded_page);
        }
        None => {
            app = app.fallback(routes::assets::embedded_page);
        }
    }

    app
}
