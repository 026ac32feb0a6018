//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Remote catalog calls (Gutendex)
//! - Title matching
//! - Reconciliation and search outcomes

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service call duration in seconds.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bookshelf_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bookshelf_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Candidates returned per remote search.
pub static CANDIDATES_FOUND: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "bookshelf_candidates_found",
            "Number of candidates returned per remote search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

// =============================================================================
// Matching Metrics
// =============================================================================

/// Title matches by winning tier.
pub static MATCH_TIER: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bookshelf_title_matches_total", "Title matches by tier"),
        &["tier"], // "exact", "contains", "keywords", "none"
    )
    .unwrap()
});

// =============================================================================
// Reconciliation Metrics
// =============================================================================

/// Search-and-save outcomes by result.
pub static SEARCH_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bookshelf_search_outcomes_total",
            "Search-and-save outcomes",
        ),
        // "saved", "duplicate_skipped", "no_match", "invalid_query",
        // "transport_error", "parse_error", "persistence_failure"
        &["result"],
    )
    .unwrap()
});

/// Authors created during reconciliation.
pub static AUTHORS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bookshelf_authors_created_total",
        "Authors created during reconciliation",
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(CANDIDATES_FOUND.clone()),
        // Matching
        Box::new(MATCH_TIER.clone()),
        // Reconciliation
        Box::new(SEARCH_OUTCOMES.clone()),
        Box::new(AUTHORS_CREATED.clone()),
    ]
}
