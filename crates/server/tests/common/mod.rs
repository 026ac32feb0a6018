//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock remote catalog and a temporary SQLite library, enabling
//! end-to-end testing without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use bookshelf_core::{
    testing::{FailingStore, MockCatalogClient},
    BookSearchService, CatalogConfig, Config, DatabaseConfig, GutendexEndpoint, GutendexParser,
    LibraryStore, ServerConfig, SqliteLibrary,
};

/// Re-export fixtures for test convenience
pub use bookshelf_core::testing::fixtures;

/// Base URL the mock catalog is addressed by.
pub const CATALOG_URL: &str = "https://gutendex.test/books/";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.respond_with(&[fixtures::candidate_book("Emma", "Austen, Jane")]).await;
///
///     let response = fixture.post("/api/v1/books/search", json!({ "title": "emma" })).await;
///
///     assert_eq!(response.body["outcome"], "saved");
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock remote catalog - configure response bodies
    pub client: Arc<MockCatalogClient>,
    /// The library the server writes to
    pub library: Arc<SqliteLibrary>,
    /// Fault-injecting wrapper around `library`, as seen by the server
    pub store: Arc<FailingStore>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let client = Arc::new(MockCatalogClient::new());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            catalog: CatalogConfig {
                base_url: CATALOG_URL.to_string(),
                ..Default::default()
            },
        };

        let library = Arc::new(SqliteLibrary::new(&db_path).expect("Failed to create library"));
        let store = Arc::new(FailingStore::new(
            Arc::clone(&library) as Arc<dyn LibraryStore>
        ));

        let search = Arc::new(BookSearchService::new(
            Arc::clone(&client) as Arc<dyn bookshelf_core::CatalogClient>,
            Arc::new(GutendexParser),
            GutendexEndpoint::from_config(&config.catalog),
            Arc::clone(&store) as Arc<dyn LibraryStore>,
        ));

        let state = Arc::new(bookshelf_server::state::AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn LibraryStore>,
            search,
        ));

        let router = bookshelf_server::api::create_router(state);

        Self {
            router,
            client,
            library,
            store,
            temp_dir,
        }
    }

    /// Answer every remote request with a page of `candidates`.
    pub async fn respond_with(&self, candidates: &[bookshelf_core::CandidateBook]) {
        self.client
            .set_default_body(fixtures::gutendex_page_json(candidates))
            .await;
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the status and raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
