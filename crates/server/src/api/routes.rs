use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{authors, books, handlers, middleware::metrics_middleware, remote};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Local library
        .route("/books", get(books::list_books))
        .route("/books/search", post(books::search_and_save))
        .route("/books/stats", get(books::get_stats))
        .route("/books/{id}", get(books::get_book).delete(books::delete_book))
        .route("/authors", get(authors::list_authors))
        .route("/authors/{id}", get(authors::get_author))
        // Remote catalog (read-only)
        .route("/remote/search", get(remote::search))
        .route("/remote/by-author", get(remote::search_by_author))
        .route("/remote/by-language", get(remote::search_by_language))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
