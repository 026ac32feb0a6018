//! Types for remote catalog responses.

use serde::{Deserialize, Serialize};

/// Language code used when a candidate lists no languages.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// A book record returned by the remote catalog, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateBook {
    /// Identifier in the remote catalog.
    pub id: String,
    /// Book title (never empty).
    pub title: String,
    /// Author names, in the order the catalog lists them.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Language codes, in the order the catalog lists them.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Download/popularity count.
    #[serde(default)]
    pub download_count: u64,
}

impl CandidateBook {
    /// First listed author, if any.
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// First listed language, or [`UNKNOWN_LANGUAGE`].
    pub fn primary_language(&self) -> &str {
        self.languages
            .first()
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LANGUAGE)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    /// Total number of matches reported by the catalog (across all pages).
    pub count: u64,
    /// URL of the next page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// URL of the previous page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Candidates in relevance order.
    #[serde(default)]
    pub results: Vec<CandidateBook>,
}
