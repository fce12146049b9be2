use crate::{
    handlers, // Import handlers module
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Meme payloads are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Creates the Axum router and associates routes with handlers.
///
/// `static_dir` must contain `index.html`, served at `/`; the whole directory is
/// served under `/static`.
pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/memes", get(handlers::list_memes).post(handlers::create_meme))
        .route(
            "/api/memes/{id}",
            get(handlers::get_meme)
                .put(handlers::update_meme)
                .delete(handlers::delete_meme),
        )
        .route("/health", get(handlers::health))
        // Static landing page and client script
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        // Middleware Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state) // Pass the application state
}
