use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{SearchError, SearchOutcome};
use crate::external_catalog::{
    CandidateBook, CatalogClient, GutendexEndpoint, ResponseParser, SearchPage,
};
use crate::library::LibraryStore;
use crate::matching::{MatchError, SearchQuery, TitleMatcher};
use crate::metrics;
use crate::reconcile::Reconciler;

/// Runs searches against the remote catalog and saves matches locally.
pub struct BookSearchService {
    client: Arc<dyn CatalogClient>,
    parser: Arc<dyn ResponseParser>,
    endpoint: GutendexEndpoint,
    matcher: TitleMatcher,
    reconciler: Reconciler,
}

impl BookSearchService {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        parser: Arc<dyn ResponseParser>,
        endpoint: GutendexEndpoint,
        store: Arc<dyn LibraryStore>,
    ) -> Self {
        Self {
            client,
            parser,
            endpoint,
            matcher: TitleMatcher::new(),
            reconciler: Reconciler::new(store),
        }
    }

    /// Replace the default title matcher.
    pub fn with_matcher(mut self, matcher: TitleMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// The local store matches are saved into.
    pub fn store(&self) -> &Arc<dyn LibraryStore> {
        self.reconciler.store()
    }

    /// Search the remote catalog for `title` and save the best match.
    ///
    /// Blank input fails before any request is made. Only the first result
    /// page is considered.
    pub async fn search_and_save(&self, title: &str) -> Result<SearchOutcome, SearchError> {
        let result = self.run_search_and_save(title).await;

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(e) => {
                warn!("Search for '{}' failed: {}", title.trim(), e);
                e.as_str()
            }
        };
        metrics::SEARCH_OUTCOMES.with_label_values(&[label]).inc();

        result
    }

    async fn run_search_and_save(&self, title: &str) -> Result<SearchOutcome, SearchError> {
        let query = parse_query(title)?;
        let url = self.endpoint.search_url(query.encoded(), None);
        let page = self.fetch_page(query.text(), &url).await?;

        let Some(found) = self.matcher.find_best(query.text(), &page.results) else {
            info!(
                "No match for '{}' among {} candidates",
                query.text(),
                page.results.len()
            );
            return Ok(SearchOutcome::NoMatch);
        };

        info!(
            "Matched '{}' to '{}' ({} tier)",
            query.text(),
            found.candidate.title,
            found.tier.as_str()
        );

        self.reconciler
            .reconcile(found.candidate)
            .await
            .map(SearchOutcome::from)
            .map_err(|source| SearchError::Persistence {
                query: query.text().to_string(),
                source,
            })
    }

    /// Candidates for a free-text query, in source order, without saving.
    pub async fn search_books(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateBook>, SearchError> {
        let query = parse_query(query)?;
        let url = self.endpoint.search_url(query.encoded(), Some(limit));
        let page = self.fetch_page(query.text(), &url).await?;

        Ok(self.truncate(page.results, limit))
    }

    /// Candidates with an author whose name contains `name`, ignoring case.
    pub async fn search_books_by_author(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<CandidateBook>, SearchError> {
        let query = parse_query(name)?;
        let url = self.endpoint.search_url(query.encoded(), None);
        let page = self.fetch_page(query.text(), &url).await?;

        let needle = query.text().to_lowercase();
        let by_author: Vec<CandidateBook> = page
            .results
            .into_iter()
            .filter(|c| c.authors.iter().any(|a| a.to_lowercase().contains(&needle)))
            .collect();

        Ok(self.truncate(by_author, limit))
    }

    /// Candidates in the given language, without saving.
    pub async fn search_books_by_language(
        &self,
        code: &str,
        limit: u32,
    ) -> Result<Vec<CandidateBook>, SearchError> {
        let query = parse_language_code(code)?;
        let url = self.endpoint.language_url(query.text(), Some(limit));
        let page = self.fetch_page(query.text(), &url).await?;

        Ok(self.truncate(page.results, limit))
    }

    async fn fetch_page(&self, query: &str, url: &str) -> Result<SearchPage, SearchError> {
        debug!("Fetching {}", url);

        let raw = self
            .client
            .fetch(url)
            .await
            .map_err(|e| SearchError::from_catalog(query, e))?;
        let page = self
            .parser
            .parse(&raw)
            .map_err(|e| SearchError::from_catalog(query, e))?;

        debug!(
            "Remote catalog returned {} of {} results for '{}'",
            page.results.len(),
            page.count,
            query
        );
        metrics::CANDIDATES_FOUND.observe(page.results.len() as f64);

        Ok(page)
    }

    fn truncate(&self, mut candidates: Vec<CandidateBook>, limit: u32) -> Vec<CandidateBook> {
        let limit = limit.min(self.endpoint.max_results()) as usize;
        candidates.truncate(limit);
        candidates
    }
}

fn parse_query(raw: &str) -> Result<SearchQuery, SearchError> {
    SearchQuery::parse(raw).map_err(|e| match e {
        MatchError::InvalidQuery(reason) => SearchError::InvalidQuery {
            query: raw.to_string(),
            reason,
        },
    })
}

/// Language codes go into the URL verbatim, so only `[A-Za-z0-9-]` and `,` separators pass.
fn parse_language_code(raw: &str) -> Result<SearchQuery, SearchError> {
    let query = parse_query(raw)?;
    let valid = query
        .text()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ',');
    if !valid {
        return Err(SearchError::InvalidQuery {
            query: raw.to_string(),
            reason: "language code may only contain letters, digits, '-' and ','".to_string(),
        });
    }
    Ok(query)
}
