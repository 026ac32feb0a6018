//! Mock catalog client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::external_catalog::{CatalogClient, ExternalCatalogError};

const EMPTY_PAGE: &str = r#"{"count":0,"next":null,"previous":null,"results":[]}"#;

/// Mock implementation of the CatalogClient trait.
///
/// Provides controllable behavior for testing:
/// - Return canned bodies per URL, or a default body
/// - Record fetched URLs for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use bookshelf_core::testing::{MockCatalogClient, fixtures};
///
/// let client = MockCatalogClient::new();
/// client
///     .set_default_body(fixtures::gutendex_page_json(&[fixtures::candidate_book("Emma", "Austen, Jane")]))
///     .await;
///
/// let body = client.fetch("https://gutendex.com/books/?search=emma").await?;
/// assert_eq!(client.fetch_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockCatalogClient {
    /// Canned bodies by exact URL.
    bodies: Arc<RwLock<HashMap<String, String>>>,
    /// Body for URLs without a canned entry. Defaults to an empty page.
    default_body: Arc<RwLock<Option<String>>>,
    /// Recorded URLs.
    fetched: Arc<RwLock<Vec<String>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<ExternalCatalogError>>>,
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogClient {
    /// Create a new mock client that answers every URL with an empty page.
    pub fn new() -> Self {
        Self {
            bodies: Arc::new(RwLock::new(HashMap::new())),
            default_body: Arc::new(RwLock::new(None)),
            fetched: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Response Configuration
    // =========================================================================

    /// Answer `url` with `body`.
    pub async fn set_body(&self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.write().await.insert(url.into(), body.into());
    }

    /// Answer every URL without a canned entry with `body`.
    pub async fn set_default_body(&self, body: impl Into<String>) {
        *self.default_body.write().await = Some(body.into());
    }

    /// Clear all canned bodies.
    pub async fn clear_bodies(&self) {
        self.bodies.write().await.clear();
        *self.default_body.write().await = None;
    }

    // =========================================================================
    // Request Recording
    // =========================================================================

    /// Get all fetched URLs, in order.
    pub async fn fetched_urls(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }

    /// Get the number of fetches performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetched.read().await.len()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: ExternalCatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn fetch(&self, url: &str) -> Result<String, ExternalCatalogError> {
        self.fetched.write().await.push(url.to_string());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(body) = self.bodies.read().await.get(url) {
            return Ok(body.clone());
        }

        Ok(self
            .default_body
            .read()
            .await
            .clone()
            .unwrap_or_else(|| EMPTY_PAGE.to_string()))
    }
}
