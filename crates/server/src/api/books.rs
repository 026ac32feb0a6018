//! Local library book handlers, including search-and-save.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bookshelf_core::{Book, LibraryStats, SearchError, SearchOutcome, StoreError};
use serde::{Deserialize, Serialize};

use super::handlers::error_response;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchBookRequest {
    /// Missing or blank titles are rejected as invalid queries.
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookQueryParams {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub min_downloads: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

fn search_error_status(error: &SearchError) -> StatusCode {
    match error {
        SearchError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
        SearchError::Transport { .. } | SearchError::Parse { .. } => StatusCode::BAD_GATEWAY,
        SearchError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_error_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Database(_) | StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/books/search
///
/// Search the remote catalog by title and save the best match.
pub async fn search_and_save(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchBookRequest>,
) -> Result<Json<SearchOutcome>, impl IntoResponse> {
    match state.search().search_and_save(&request.title).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err(error_response(search_error_status(&e), e)),
    }
}

/// GET /api/v1/books
///
/// List saved books, optionally filtered by language, author name fragment
/// and a download threshold.
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookQueryParams>,
) -> Result<Json<BookListResponse>, impl IntoResponse> {
    let library = state.library();

    let selected = match (&params.language, &params.author, params.min_downloads) {
        (Some(language), _, _) => library.books_by_language(language),
        (None, Some(author), _) => library.books_by_author_name(author),
        (None, None, Some(min)) => library.popular_books(min),
        (None, None, None) => library.list_books(),
    };

    let mut books = match selected {
        Ok(books) => books,
        Err(e) => return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e)),
    };

    if params.language.is_some() {
        if let Some(author) = &params.author {
            let needle = author.to_lowercase();
            books.retain(|b| b.author.name.to_lowercase().contains(&needle));
        }
    }
    if let Some(min) = params.min_downloads {
        books.retain(|b| b.download_count > min);
    }

    let total = books.len();
    Ok(Json(BookListResponse { books, total }))
}

/// GET /api/v1/books/stats
///
/// Get library statistics.
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LibraryStats>, impl IntoResponse> {
    match state.library().stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// GET /api/v1/books/{id}
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, impl IntoResponse> {
    match state.library().get_book(id) {
        Ok(book) => Ok(Json(book)),
        Err(e) => Err(error_response(store_error_status(&e), e)),
    }
}

/// DELETE /api/v1/books/{id}
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, impl IntoResponse> {
    match state.library().delete_book(id) {
        Ok(()) => Ok(Json(SuccessResponse {
            message: format!("Removed book {}", id),
        })),
        Err(e) => Err(error_response(store_error_status(&e), e)),
    }
}
