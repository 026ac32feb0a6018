//! Search-and-save: the top-level operation tying the pipeline together.
//!
//! User text goes through the query builder, the remote catalog client and
//! parser, the title matcher, and finally the reconciler. Each stage's
//! failure is wrapped into [`SearchError`] together with the query text.

mod service;

pub use service::BookSearchService;

use serde::Serialize;
use thiserror::Error;

use crate::external_catalog::ExternalCatalogError;
use crate::library::Book;
use crate::reconcile::{ReconcileError, ReconcileOutcome};

/// Terminal, non-error results of a search-and-save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "book", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// No candidate matched the title.
    NoMatch,
    /// The matched book was added to the library.
    Saved(Book),
    /// The matched book was already in the library.
    DuplicateSkipped(Book),
}

impl SearchOutcome {
    pub fn book(&self) -> Option<&Book> {
        match self {
            SearchOutcome::NoMatch => None,
            SearchOutcome::Saved(book) | SearchOutcome::DuplicateSkipped(book) => Some(book),
        }
    }

    /// Label used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOutcome::NoMatch => "no_match",
            SearchOutcome::Saved(_) => "saved",
            SearchOutcome::DuplicateSkipped(_) => "duplicate_skipped",
        }
    }
}

impl From<ReconcileOutcome> for SearchOutcome {
    fn from(outcome: ReconcileOutcome) -> Self {
        match outcome {
            ReconcileOutcome::Saved(book) => SearchOutcome::Saved(book),
            ReconcileOutcome::DuplicateSkipped(book) => SearchOutcome::DuplicateSkipped(book),
        }
    }
}

/// Errors that abort a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("Remote catalog request failed for '{query}': {source}")]
    Transport {
        query: String,
        #[source]
        source: ExternalCatalogError,
    },

    #[error("Could not parse remote catalog response for '{query}': {source}")]
    Parse {
        query: String,
        #[source]
        source: ExternalCatalogError,
    },

    #[error("Failed to save match for '{query}': {source}")]
    Persistence {
        query: String,
        #[source]
        source: ReconcileError,
    },
}

impl SearchError {
    /// Classify a catalog error raised while handling `query`.
    pub(crate) fn from_catalog(query: &str, source: ExternalCatalogError) -> Self {
        let query = query.to_string();
        if source.is_transport() {
            SearchError::Transport { query, source }
        } else {
            SearchError::Parse { query, source }
        }
    }

    /// Label used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchError::InvalidQuery { .. } => "invalid_query",
            SearchError::Transport { .. } => "transport_error",
            SearchError::Parse { .. } => "parse_error",
            SearchError::Persistence { .. } => "persistence_failure",
        }
    }

    /// The query text the failed operation was given.
    pub fn query(&self) -> &str {
        match self {
            SearchError::InvalidQuery { query, .. }
            | SearchError::Transport { query, .. }
            | SearchError::Parse { query, .. }
            | SearchError::Persistence { query, .. } => query,
        }
    }
}
