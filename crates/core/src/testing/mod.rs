//! Testing utilities and mock implementations.
//!
//! Deterministic stand-ins for the remote catalog and fault-injecting
//! wrappers for the local store, so the search pipeline can be exercised
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookshelf_core::testing::{fixtures, FailingStore, MockCatalogClient};
//!
//! let client = MockCatalogClient::new();
//! client
//!     .set_default_body(fixtures::gutendex_page_json(&[fixtures::candidate_book("Emma", "Austen, Jane")]))
//!     .await;
//!
//! let store = FailingStore::new(Arc::new(SqliteLibrary::in_memory()?));
//! store.fail_book_saves(true);
//! ```

mod failing_store;
mod mock_catalog_client;

pub use failing_store::FailingStore;
pub use mock_catalog_client::MockCatalogClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::external_catalog::CandidateBook;

    /// Create an English candidate with a single author.
    pub fn candidate_book(title: &str, author: &str) -> CandidateBook {
        candidate_book_with(title, &[author], &["en"], 100)
    }

    /// Create a candidate with explicit authors, languages and download count.
    pub fn candidate_book_with(
        title: &str,
        authors: &[&str],
        languages: &[&str],
        download_count: u64,
    ) -> CandidateBook {
        CandidateBook {
            id: format!("gb-{}", title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            authors: authors.iter().map(|s| s.to_string()).collect(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            download_count,
        }
    }

    /// Render candidates as a Gutendex search response body.
    pub fn gutendex_page_json(candidates: &[CandidateBook]) -> String {
        let results: Vec<_> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                json!({
                    "id": i + 1,
                    "title": c.title,
                    "authors": c
                        .authors
                        .iter()
                        .map(|name| json!({ "name": name, "birth_year": null, "death_year": null }))
                        .collect::<Vec<_>>(),
                    "subjects": [],
                    "languages": c.languages,
                    "copyright": false,
                    "media_type": "Text",
                    "download_count": c.download_count,
                })
            })
            .collect();

        json!({
            "count": candidates.len(),
            "next": null,
            "previous": null,
            "results": results,
        })
        .to_string()
    }
}
