//! Local library store - authors and the books they own.
//!
//! The store is deliberately narrow: reconciliation only needs the
//! find/save pairs, everything else serves the read-side API.

mod sqlite;
mod types;

pub use sqlite::SqliteLibrary;
pub use types::*;

/// Trait for local library storage.
pub trait LibraryStore: Send + Sync {
    /// Find an author whose name equals `name`, ignoring case.
    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>, StoreError>;

    /// Persist a new author.
    ///
    /// Fails with `Conflict` if an author with the same name (ignoring case)
    /// already exists.
    fn save_author(&self, author: &NewAuthor) -> Result<Author, StoreError>;

    /// Find a book by exact title and owning author.
    fn find_book_by_title_and_author(
        &self,
        title: &str,
        author_id: i64,
    ) -> Result<Option<Book>, StoreError>;

    /// Persist a new book and return it with its author populated.
    ///
    /// Fails with `Conflict` if the (title, author) pair already exists or
    /// the author does not.
    fn save_book(&self, book: &NewBook) -> Result<Book, StoreError>;

    /// Get a book by id.
    fn get_book(&self, id: i64) -> Result<Book, StoreError>;

    /// Get an author by id.
    fn get_author(&self, id: i64) -> Result<Author, StoreError>;

    /// All books, ordered by title.
    fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// All authors, ordered by name.
    fn list_authors(&self) -> Result<Vec<Author>, StoreError>;

    /// Books whose language code equals `code`, ignoring case.
    fn books_by_language(&self, code: &str) -> Result<Vec<Book>, StoreError>;

    /// Books whose author name contains `fragment`, ignoring case.
    fn books_by_author_name(&self, fragment: &str) -> Result<Vec<Book>, StoreError>;

    /// Books with more than `min_downloads` downloads, most downloaded first.
    fn popular_books(&self, min_downloads: u64) -> Result<Vec<Book>, StoreError>;

    /// Authors alive in `year`. Authors without a birth year are excluded.
    fn authors_alive_in_year(&self, year: i32) -> Result<Vec<Author>, StoreError>;

    /// Remove a book.
    fn delete_book(&self, id: i64) -> Result<(), StoreError>;

    /// Library statistics.
    fn stats(&self) -> Result<LibraryStats, StoreError>;
}
