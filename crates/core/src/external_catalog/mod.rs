//! Remote book catalog integration.
//!
//! The search pipeline talks to the remote source through two narrow ports:
//! a [`CatalogClient`] that turns a URL into raw response text, and a
//! [`ResponseParser`] that decodes that text into a [`SearchPage`]. The
//! Gutendex implementations live in [`gutendex`]; tests substitute
//! `testing::MockCatalogClient`.

mod gutendex;
mod types;

pub use gutendex::{GutendexClient, GutendexEndpoint, GutendexParser};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with the remote catalog.
#[derive(Debug, Error)]
pub enum ExternalCatalogError {
    /// HTTP request failed (connection refused, DNS, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout.
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// API returned a non-2xx status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ExternalCatalogError {
    /// Whether this error happened while talking to the remote side,
    /// as opposed to while decoding what it sent back.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ExternalCatalogError::Parse(_))
    }
}

/// Fetches raw response bodies from the remote catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// GET `url` and return the body text.
    ///
    /// Network failures, timeouts and non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> Result<String, ExternalCatalogError>;
}

/// Decodes raw catalog responses.
pub trait ResponseParser: Send + Sync {
    /// Parse a response body into a page of candidate books.
    ///
    /// Unknown fields are ignored; malformed JSON is a `Parse` error.
    fn parse(&self, raw: &str) -> Result<SearchPage, ExternalCatalogError>;
}
