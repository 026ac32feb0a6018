use std::sync::Arc;

use bookshelf_core::{BookSearchService, Config, LibraryStore, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    library: Arc<dyn LibraryStore>,
    search: Arc<BookSearchService>,
}

impl AppState {
    pub fn new(
        config: Config,
        library: Arc<dyn LibraryStore>,
        search: Arc<BookSearchService>,
    ) -> Self {
        Self {
            config,
            library,
            search,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn library(&self) -> &dyn LibraryStore {
        self.library.as_ref()
    }

    pub fn search(&self) -> &BookSearchService {
        self.search.as_ref()
    }
}
