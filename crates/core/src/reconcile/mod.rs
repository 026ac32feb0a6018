//! Reconciliation of remote candidates into the local library.
//!
//! A matched [`CandidateBook`](crate::external_catalog::CandidateBook) is turned
//! into a persisted author/book pair. The author is found by case-insensitive
//! name or created; the book is saved unless the same (title, author) pair is
//! already present.

mod reconciler;

pub use reconciler::Reconciler;

use serde::Serialize;
use thiserror::Error;

use crate::library::{Book, StoreError};

/// Author name used for candidates that list no authors.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Result of reconciling one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "book", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The book was inserted.
    Saved(Book),
    /// A book with the same title and author already existed; nothing was inserted.
    DuplicateSkipped(Book),
}

impl ReconcileOutcome {
    /// The saved or pre-existing book.
    pub fn book(&self) -> &Book {
        match self {
            ReconcileOutcome::Saved(book) | ReconcileOutcome::DuplicateSkipped(book) => book,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, ReconcileOutcome::DuplicateSkipped(_))
    }
}

/// Errors from reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to save author '{name}': {source}")]
    Author {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to save book '{title}': {source}")]
    Book {
        title: String,
        #[source]
        source: StoreError,
    },
}
