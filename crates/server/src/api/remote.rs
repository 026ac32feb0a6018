//! Remote catalog browsing. Nothing here writes to the library.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bookshelf_core::{CandidateBook, SearchError};
use serde::{Deserialize, Serialize};

use super::handlers::error_response;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RemoteSearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoteAuthorParams {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoteLanguageParams {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub results: Vec<CandidateBook>,
    pub total: usize,
}

fn to_response(
    result: Result<Vec<CandidateBook>, SearchError>,
) -> Result<Json<CandidateListResponse>, impl IntoResponse> {
    match result {
        Ok(results) => {
            let total = results.len();
            Ok(Json(CandidateListResponse { results, total }))
        }
        Err(e) => {
            let status = match &e {
                SearchError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err(error_response(status, e))
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/remote/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RemoteSearchParams>,
) -> impl IntoResponse {
    to_response(state.search().search_books(&params.query, params.limit).await)
}

/// GET /api/v1/remote/by-author
pub async fn search_by_author(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RemoteAuthorParams>,
) -> impl IntoResponse {
    to_response(
        state
            .search()
            .search_books_by_author(&params.name, params.limit)
            .await,
    )
}

/// GET /api/v1/remote/by-language
pub async fn search_by_language(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RemoteLanguageParams>,
) -> impl IntoResponse {
    to_response(
        state
            .search()
            .search_books_by_language(&params.code, params.limit)
            .await,
    )
}
