use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{ReconcileError, ReconcileOutcome, UNKNOWN_AUTHOR};
use crate::external_catalog::CandidateBook;
use crate::library::{Author, LibraryStore, NewAuthor, NewBook, StoreError};
use crate::metrics;

/// Maps matched candidates onto local authors and books.
pub struct Reconciler {
    store: Arc<dyn LibraryStore>,
    /// Held across each find-or-create sequence.
    write_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn LibraryStore> {
        &self.store
    }

    /// Persist `candidate` as a local book.
    ///
    /// The author is resolved from the candidate's first author name (or
    /// [`UNKNOWN_AUTHOR`]). An author created here is kept even if saving the
    /// book then fails.
    pub async fn reconcile(
        &self,
        candidate: &CandidateBook,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let _guard = self.write_lock.lock().await;

        let author_name = candidate.primary_author().unwrap_or(UNKNOWN_AUTHOR);
        let author = self.find_or_create_author(author_name)?;

        let book_error = |source: StoreError| ReconcileError::Book {
            title: candidate.title.clone(),
            source,
        };

        if let Some(existing) = self
            .store
            .find_book_by_title_and_author(&candidate.title, author.id)
            .map_err(book_error)?
        {
            info!(
                "Skipping duplicate book '{}' by '{}' (id {})",
                existing.title, author.name, existing.id
            );
            return Ok(ReconcileOutcome::DuplicateSkipped(existing));
        }

        let new_book = NewBook {
            title: candidate.title.clone(),
            author_id: author.id,
            language: candidate.primary_language().to_string(),
            download_count: candidate.download_count,
        };

        match self.store.save_book(&new_book) {
            Ok(book) => {
                info!(
                    "Saved book '{}' by '{}' (id {})",
                    book.title, book.author.name, book.id
                );
                Ok(ReconcileOutcome::Saved(book))
            }
            // Inserted by another writer between the check and the save
            Err(StoreError::Conflict(_)) => {
                match self
                    .store
                    .find_book_by_title_and_author(&new_book.title, author.id)
                    .map_err(book_error)?
                {
                    Some(existing) => Ok(ReconcileOutcome::DuplicateSkipped(existing)),
                    None => Err(book_error(StoreError::Conflict(format!(
                        "book '{}' conflicts with an unknown row",
                        new_book.title
                    )))),
                }
            }
            Err(e) => Err(book_error(e)),
        }
    }

    fn find_or_create_author(&self, name: &str) -> Result<Author, ReconcileError> {
        let author_error = |source: StoreError| ReconcileError::Author {
            name: name.to_string(),
            source,
        };

        if let Some(author) = self.store.find_author_by_name(name).map_err(author_error)? {
            debug!("Reusing author '{}' (id {})", author.name, author.id);
            return Ok(author);
        }

        match self.store.save_author(&NewAuthor::named(name)) {
            Ok(author) => {
                info!("Created author '{}' (id {})", author.name, author.id);
                metrics::AUTHORS_CREATED.inc();
                Ok(author)
            }
            Err(StoreError::Conflict(_)) => self
                .store
                .find_author_by_name(name)
                .map_err(author_error)?
                .ok_or_else(|| {
                    author_error(StoreError::Conflict(format!(
                        "author '{}' conflicts with an unknown row",
                        name
                    )))
                }),
            Err(e) => Err(author_error(e)),
        }
    }
}
