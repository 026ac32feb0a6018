//! Local library author handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bookshelf_core::{Author, StoreError};
use serde::{Deserialize, Serialize};

use super::handlers::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthorQueryParams {
    /// Only authors alive during this year.
    #[serde(default)]
    pub alive_in: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AuthorListResponse {
    pub authors: Vec<Author>,
    pub total: usize,
}

/// GET /api/v1/authors
pub async fn list_authors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorQueryParams>,
) -> Result<Json<AuthorListResponse>, impl IntoResponse> {
    let library = state.library();

    let result = match params.alive_in {
        Some(year) => library.authors_alive_in_year(year),
        None => library.list_authors(),
    };

    match result {
        Ok(authors) => {
            let total = authors.len();
            Ok(Json(AuthorListResponse { authors, total }))
        }
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}

/// GET /api/v1/authors/{id}
pub async fn get_author(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Author>, impl IntoResponse> {
    match state.library().get_author(id) {
        Ok(author) => Ok(Json(author)),
        Err(StoreError::NotFound(_)) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Author not found: {}", id),
        )),
        Err(e) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e)),
    }
}
