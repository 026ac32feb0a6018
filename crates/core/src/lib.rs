pub mod config;
pub mod external_catalog;
pub mod library;
pub mod matching;
pub mod metrics;
pub mod reconcile;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, CatalogConfig, Config, ConfigError,
    DatabaseConfig, SanitizedConfig, ServerConfig,
};
pub use external_catalog::{
    CandidateBook, CatalogClient, ExternalCatalogError, GutendexClient, GutendexEndpoint,
    GutendexParser, ResponseParser, SearchPage,
};
pub use library::{
    Author, Book, LibraryStats, LibraryStore, NewAuthor, NewBook, SqliteLibrary, StoreError,
};
pub use matching::{MatchError, MatchTier, SearchQuery, TitleMatch, TitleMatcher};
pub use reconcile::{ReconcileError, ReconcileOutcome, Reconciler, UNKNOWN_AUTHOR};
pub use search::{BookSearchService, SearchError, SearchOutcome};
