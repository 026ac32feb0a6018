//! Types for the local library.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A persisted author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// Whether the author was alive during `year`.
    pub fn alive_in(&self, year: i32) -> bool {
        match self.birth_year {
            Some(born) => born <= year && self.death_year.map_or(true, |died| died >= year),
            None => false,
        }
    }
}

/// A persisted book with its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Author,
    pub language: String,
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
}

/// An author about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

impl NewAuthor {
    /// Author known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_year: None,
            death_year: None,
        }
    }
}

/// A book about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: i64,
    pub language: String,
    pub download_count: u64,
}

/// Library statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryStats {
    pub total_books: u64,
    pub total_authors: u64,
    pub most_common_language: String,
    pub most_prolific_author: String,
    pub most_prolific_author_book_count: u64,
    pub average_downloads: f64,
}

/// Errors for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(birth: Option<i32>, death: Option<i32>) -> Author {
        Author {
            id: 1,
            name: "Austen, Jane".to_string(),
            birth_year: birth,
            death_year: death,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_alive_in() {
        let jane = author(Some(1775), Some(1817));
        assert!(jane.alive_in(1775));
        assert!(jane.alive_in(1800));
        assert!(jane.alive_in(1817));
        assert!(!jane.alive_in(1818));
        assert!(!jane.alive_in(1700));
    }

    #[test]
    fn test_alive_in_without_death_year() {
        assert!(author(Some(1950), None).alive_in(2024));
    }

    #[test]
    fn test_alive_in_unknown_birth() {
        assert!(!author(None, None).alive_in(1900));
    }

    #[test]
    fn test_author_serialization_skips_missing_years() {
        let json = serde_json::to_value(author(None, None)).unwrap();
        assert!(json.get("birth_year").is_none());
        assert_eq!(json["name"], "Austen, Jane");
    }
}
