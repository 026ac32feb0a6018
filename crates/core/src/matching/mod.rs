//! Query construction and title matching.
//!
//! A raw user string becomes a [`SearchQuery`] (trimmed text plus a
//! transport-safe token), and a [`TitleMatcher`] picks at most one candidate
//! out of the remote results by trying its tiers in order:
//!
//! ```text
//! Exact      title == query            (case-insensitive)
//! Contains   query is a substring of title
//! Keywords   every query word appears in title as a whole word
//! ```
//!
//! The first tier with any hit wins; inside a tier the first candidate in
//! source order wins. There is no scoring across tiers.

mod query_builder;
mod title_matcher;

pub use query_builder::SearchQuery;
pub use title_matcher::{
    containment_match, contains_whole_word, exact_match, keyword_match, MatchTier, TierFn,
    TitleMatch, TitleMatcher,
};

use thiserror::Error;

/// Errors raised while preparing a search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
