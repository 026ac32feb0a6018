//! Store wrapper for persistence-fault injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::library::{
    Author, Book, LibraryStats, LibraryStore, NewAuthor, NewBook, StoreError,
};

/// Delegates to an inner store, failing selected writes on demand.
pub struct FailingStore {
    inner: Arc<dyn LibraryStore>,
    fail_author_saves: AtomicBool,
    fail_book_saves: AtomicBool,
    fail_reads: AtomicBool,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn LibraryStore>) -> Self {
        Self {
            inner,
            fail_author_saves: AtomicBool::new(false),
            fail_book_saves: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make `save_author` fail.
    pub fn fail_author_saves(&self, fail: bool) {
        self.fail_author_saves.store(fail, Ordering::SeqCst);
    }

    /// Make `save_book` fail.
    pub fn fail_book_saves(&self, fail: bool) {
        self.fail_book_saves.store(fail, Ordering::SeqCst);
    }

    /// Make every lookup and listing fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Database(format!("injected failure in {}", operation)));
        }
        Ok(())
    }

    fn read(&self, operation: &str) -> Result<(), StoreError> {
        Self::check(&self.fail_reads, operation)
    }
}

impl LibraryStore for FailingStore {
    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>, StoreError> {
        self.read("find_author_by_name")?;
        self.inner.find_author_by_name(name)
    }

    fn save_author(&self, author: &NewAuthor) -> Result<Author, StoreError> {
        Self::check(&self.fail_author_saves, "save_author")?;
        self.inner.save_author(author)
    }

    fn find_book_by_title_and_author(
        &self,
        title: &str,
        author_id: i64,
    ) -> Result<Option<Book>, StoreError> {
        self.read("find_book_by_title_and_author")?;
        self.inner.find_book_by_title_and_author(title, author_id)
    }

    fn save_book(&self, book: &NewBook) -> Result<Book, StoreError> {
        Self::check(&self.fail_book_saves, "save_book")?;
        self.inner.save_book(book)
    }

    fn get_book(&self, id: i64) -> Result<Book, StoreError> {
        self.read("get_book")?;
        self.inner.get_book(id)
    }

    fn get_author(&self, id: i64) -> Result<Author, StoreError> {
        self.read("get_author")?;
        self.inner.get_author(id)
    }

    fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.read("list_books")?;
        self.inner.list_books()
    }

    fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        self.read("list_authors")?;
        self.inner.list_authors()
    }

    fn books_by_language(&self, code: &str) -> Result<Vec<Book>, StoreError> {
        self.read("books_by_language")?;
        self.inner.books_by_language(code)
    }

    fn books_by_author_name(&self, fragment: &str) -> Result<Vec<Book>, StoreError> {
        self.read("books_by_author_name")?;
        self.inner.books_by_author_name(fragment)
    }

    fn popular_books(&self, min_downloads: u64) -> Result<Vec<Book>, StoreError> {
        self.read("popular_books")?;
        self.inner.popular_books(min_downloads)
    }

    fn authors_alive_in_year(&self, year: i32) -> Result<Vec<Author>, StoreError> {
        self.read("authors_alive_in_year")?;
        self.inner.authors_alive_in_year(year)
    }

    fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        self.inner.delete_book(id)
    }

    fn stats(&self) -> Result<LibraryStats, StoreError> {
        self.read("stats")?;
        self.inner.stats()
    }
}
