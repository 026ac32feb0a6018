//! Gutendex (Project Gutenberg) catalog client and response parser.
//!
//! Gutendex answers `GET /books/?search=<terms>` with
//! `{ count, next, previous, results: [...] }`. Authors come back as objects
//! with a `name` field; some mirrors return bare strings, so both are accepted.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::{CandidateBook, SearchPage};
use super::{CatalogClient, ExternalCatalogError, ResponseParser};
use crate::config::CatalogConfig;
use crate::metrics;

const SERVICE: &str = "gutendex";

/// Gutendex HTTP client.
pub struct GutendexClient {
    client: Client,
    timeout: Duration,
}

impl GutendexClient {
    /// Create a new Gutendex client.
    pub fn new(config: &CatalogConfig) -> Result<Self, ExternalCatalogError> {
        let timeout = Duration::from_secs(u64::from(config.timeout_secs));
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }

    async fn get_text(&self, url: &str) -> Result<String, ExternalCatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!("Gutendex response: status={}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gutendex returned {} for {}", status, url);
            return Err(ExternalCatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> ExternalCatalogError {
        if err.is_timeout() {
            ExternalCatalogError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            ExternalCatalogError::Http(err)
        }
    }
}

#[async_trait]
impl CatalogClient for GutendexClient {
    async fn fetch(&self, url: &str) -> Result<String, ExternalCatalogError> {
        debug!("Gutendex fetch: url='{}'", url);
        let start = Instant::now();

        let result = self.get_text(url).await;

        let status = if result.is_ok() { "success" } else { "error" };
        metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&[SERVICE, "fetch"])
            .observe(start.elapsed().as_secs_f64());
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&[SERVICE, "fetch", status])
            .inc();

        result
    }
}

/// Builds request URLs for the Gutendex books endpoint.
#[derive(Debug, Clone)]
pub struct GutendexEndpoint {
    base_url: String,
    max_results: u32,
}

impl GutendexEndpoint {
    pub fn new(base_url: impl Into<String>, max_results: u32) -> Self {
        Self {
            base_url: base_url.into(),
            max_results,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(config.base_url.clone(), config.max_results)
    }

    /// Upper bound applied to every requested limit.
    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// URL for a free-text search. `encoded_query` must already be transport-safe.
    pub fn search_url(&self, encoded_query: &str, limit: Option<u32>) -> String {
        let url = format!("{}?search={}", self.base_url, encoded_query);
        self.with_limit(url, limit)
    }

    /// URL for browsing by language code.
    pub fn language_url(&self, code: &str, limit: Option<u32>) -> String {
        let url = format!("{}?languages={}", self.base_url, code.trim().to_lowercase());
        self.with_limit(url, limit)
    }

    fn with_limit(&self, url: String, limit: Option<u32>) -> String {
        match limit {
            Some(limit) => format!("{}&limit={}", url, limit.min(self.max_results)),
            None => url,
        }
    }
}

/// Decodes Gutendex JSON into [`SearchPage`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct GutendexParser;

impl ResponseParser for GutendexParser {
    fn parse(&self, raw: &str) -> Result<SearchPage, ExternalCatalogError> {
        let response: GbResponse = serde_json::from_str(raw).map_err(|e| {
            ExternalCatalogError::Parse(format!("Failed to parse search response: {}", e))
        })?;

        Ok(response.into())
    }
}

// ============================================================================
// Gutendex API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct GbResponse {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
    #[serde(default)]
    results: Vec<GbBook>,
}

#[derive(Debug, Deserialize)]
struct GbBook {
    #[serde(default)]
    id: Option<GbId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<GbAuthor>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    download_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GbId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GbAuthor {
    Name(String),
    Record {
        #[serde(default)]
        name: Option<String>,
    },
}

impl GbAuthor {
    fn into_name(self) -> Option<String> {
        let name = match self {
            GbAuthor::Name(name) => name,
            GbAuthor::Record { name } => name?,
        };
        let name = name.trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

impl From<GbResponse> for SearchPage {
    fn from(gb: GbResponse) -> Self {
        let results = gb
            .results
            .into_iter()
            .filter_map(|book| {
                let title = book.title.filter(|t| !t.trim().is_empty());
                let Some(title) = title else {
                    debug!("Skipping Gutendex result without a title");
                    return None;
                };

                let id = match book.id {
                    Some(GbId::Number(n)) => n.to_string(),
                    Some(GbId::Text(s)) => s,
                    None => String::new(),
                };

                Some(CandidateBook {
                    id,
                    title,
                    authors: book
                        .authors
                        .into_iter()
                        .filter_map(GbAuthor::into_name)
                        .collect(),
                    languages: book.languages,
                    download_count: book.download_count.unwrap_or(0),
                })
            })
            .collect();

        SearchPage {
            count: gb.count,
            next: gb.next,
            previous: gb.previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "count": 2,
        "next": "https://gutendex.com/books/?page=2&search=pride",
        "previous": null,
        "results": [
            {
                "id": 1342,
                "title": "Pride and Prejudice",
                "authors": [{"name": "Austen, Jane", "birth_year": 1775, "death_year": 1817}],
                "translators": [],
                "subjects": ["Courtship -- Fiction"],
                "languages": ["en"],
                "copyright": false,
                "media_type": "Text",
                "formats": {"text/html": "https://www.gutenberg.org/ebooks/1342.html.images"},
                "download_count": 48920
            },
            {
                "id": 42671,
                "title": "Pride and Prejudice: A Play",
                "authors": [],
                "languages": [],
                "download_count": 12
            }
        ]
    }"#;

    #[test]
    fn test_parse_full_response() {
        let page = GutendexParser.parse(SAMPLE).unwrap();

        assert_eq!(page.count, 2);
        assert!(page.next.is_some());
        assert!(page.previous.is_none());
        assert_eq!(page.results.len(), 2);

        let first = &page.results[0];
        assert_eq!(first.id, "1342");
        assert_eq!(first.title, "Pride and Prejudice");
        assert_eq!(first.authors, vec!["Austen, Jane".to_string()]);
        assert_eq!(first.languages, vec!["en".to_string()]);
        assert_eq!(first.download_count, 48920);

        assert!(page.results[1].authors.is_empty());
        assert_eq!(page.results[1].primary_language(), "unknown");
    }

    #[test]
    fn test_parse_empty_object_yields_no_results() {
        let page = GutendexParser.parse("{}").unwrap();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_parse_authors_as_strings() {
        let raw = r#"{"count": 1, "results": [
            {"id": "abc", "title": "Dracula", "authors": ["Stoker, Bram"], "languages": ["en"]}
        ]}"#;
        let page = GutendexParser.parse(raw).unwrap();
        assert_eq!(page.results[0].id, "abc");
        assert_eq!(page.results[0].authors, vec!["Stoker, Bram".to_string()]);
        assert_eq!(page.results[0].download_count, 0);
    }

    #[test]
    fn test_parse_skips_untitled_results_and_nameless_authors() {
        let raw = r#"{"count": 2, "results": [
            {"id": 1, "title": "  ", "authors": []},
            {"id": 2, "title": "Emma", "authors": [{"name": null}, {"name": "Austen, Jane"}]}
        ]}"#;
        let page = GutendexParser.parse(raw).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].title, "Emma");
        assert_eq!(page.results[0].authors, vec!["Austen, Jane".to_string()]);
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = GutendexParser.parse(r#"{"count": 1, "results": ["#);
        assert!(matches!(result, Err(ExternalCatalogError::Parse(_))));
    }

    #[test]
    fn test_search_url_without_limit() {
        let endpoint = GutendexEndpoint::new("https://gutendex.com/books/", 20);
        assert_eq!(
            endpoint.search_url("the%20great%20gatsby", None),
            "https://gutendex.com/books/?search=the%20great%20gatsby"
        );
    }

    #[test]
    fn test_search_url_caps_limit() {
        let endpoint = GutendexEndpoint::new("https://gutendex.com/books/", 20);
        assert_eq!(
            endpoint.search_url("dickens", Some(50)),
            "https://gutendex.com/books/?search=dickens&limit=20"
        );
        assert_eq!(
            endpoint.search_url("dickens", Some(5)),
            "https://gutendex.com/books/?search=dickens&limit=5"
        );
    }

    #[test]
    fn test_language_url_lowercases_code() {
        let endpoint = GutendexEndpoint::new("https://gutendex.com/books/", 20);
        assert_eq!(
            endpoint.language_url(" FR ", Some(3)),
            "https://gutendex.com/books/?languages=fr&limit=3"
        );
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_classified() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and never answer
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let config = CatalogConfig {
            timeout_secs: 1,
            ..CatalogConfig::default()
        };
        let client = GutendexClient::new(&config).unwrap();

        let err = client
            .fetch(&format!("http://{}/books/?search=emma", addr))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ExternalCatalogError::Timeout { secs: 1 }),
            "unexpected error: {:?}",
            err
        );
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_http() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GutendexClient::new(&CatalogConfig::default()).unwrap();
        let err = client
            .fetch(&format!("http://{}/books/?search=emma", addr))
            .await
            .unwrap_err();
        assert!(
            matches!(err, ExternalCatalogError::Http(_)),
            "unexpected error: {:?}",
            err
        );
        assert!(err.is_transport());
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = GutendexClient::new(&CatalogConfig::default()).unwrap();
        assert_eq!(client.timeout, Duration::from_secs(30));
    }
}
