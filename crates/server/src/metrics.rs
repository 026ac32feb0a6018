//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the bookshelf server:
//! - HTTP request metrics (latency, counts)
//! - Library size (collected dynamically)
//! - Core search, matching and remote catalog metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bookshelf_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bookshelf_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bookshelf_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Library Metrics (collected dynamically)
// =============================================================================

/// Books in the local library.
pub static LIBRARY_BOOKS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("bookshelf_library_books", "Number of books in the library").unwrap()
});

/// Authors in the local library.
pub static LIBRARY_AUTHORS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bookshelf_library_authors",
        "Number of authors in the library",
    )
    .unwrap()
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Library
    registry.register(Box::new(LIBRARY_BOOKS.clone())).unwrap();
    registry.register(Box::new(LIBRARY_AUTHORS.clone())).unwrap();

    // Core metrics (search outcomes, matching, remote catalog)
    for metric in bookshelf_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the library gauges reflect the store.
pub fn collect_dynamic_metrics(state: &AppState) {
    match state.library().stats() {
        Ok(stats) => {
            LIBRARY_BOOKS.set(stats.total_books as i64);
            LIBRARY_AUTHORS.set(stats.total_authors as i64);
        }
        Err(e) => warn!("Failed to collect library stats: {}", e),
    }
}

/// Normalize a path for metric labels (replace numeric IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Applied twice: adjacent IDs share the slash between them
    let result = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.into_owned()
}
