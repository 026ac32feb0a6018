//! SQLite-backed library store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::{Author, Book, LibraryStats, LibraryStore, NewAuthor, NewBook, StoreError};

const BOOK_COLUMNS: &str = "b.id, b.title, b.language, b.download_count, b.created_at,
                            a.id, a.name, a.birth_year, a.death_year, a.created_at";

const UNKNOWN_STAT: &str = "Unknown";

/// Download counts are stored as SQLite INTEGER; values past `i64::MAX` saturate.
fn downloads_to_sql(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn downloads_from_sql(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// SQLite-backed library store.
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl SqliteLibrary {
    /// Create a new SQLite library, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite library (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- name_key holds the lowercased name; at most one author per key
            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL UNIQUE,
                birth_year INTEGER,
                death_year INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author_id INTEGER NOT NULL REFERENCES authors(id),
                language TEXT NOT NULL,
                download_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                UNIQUE(title, author_id)
            );

            CREATE INDEX IF NOT EXISTS idx_books_author ON books(author_id);
            CREATE INDEX IF NOT EXISTS idx_books_language ON books(language);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Internal("library connection lock poisoned".to_string()))
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    /// Map an insert failure, turning constraint violations into `Conflict`.
    fn insert_error(e: rusqlite::Error, what: &str) -> StoreError {
        match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(format!("{}: {}", what, e))
            }
            _ => StoreError::Database(e.to_string()),
        }
    }

    fn row_to_author(row: &rusqlite::Row) -> rusqlite::Result<Author> {
        let created_at: String = row.get(4)?;
        Ok(Author {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_year: row.get(2)?,
            death_year: row.get(3)?,
            created_at: Self::parse_timestamp(&created_at),
        })
    }

    /// Convert a row selected with `BOOK_COLUMNS` to a Book.
    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let book_created: String = row.get(4)?;
        let author_created: String = row.get(9)?;
        let downloads: i64 = row.get(3)?;

        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            language: row.get(2)?,
            download_count: downloads_from_sql(downloads),
            created_at: Self::parse_timestamp(&book_created),
            author: Author {
                id: row.get(5)?,
                name: row.get(6)?,
                birth_year: row.get(7)?,
                death_year: row.get(8)?,
                created_at: Self::parse_timestamp(&author_created),
            },
        })
    }

    fn query_books<P: rusqlite::Params>(
        conn: &Connection,
        filter: &str,
        order: &str,
        params: P,
    ) -> Result<Vec<Book>, StoreError> {
        let sql = format!(
            "SELECT {} FROM books b JOIN authors a ON a.id = b.author_id {} ORDER BY {}",
            BOOK_COLUMNS, filter, order
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_book)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(books)
    }

    fn query_authors<P: rusqlite::Params>(
        conn: &Connection,
        filter: &str,
        params: P,
    ) -> Result<Vec<Author>, StoreError> {
        let sql = format!(
            "SELECT id, name, birth_year, death_year, created_at FROM authors {} ORDER BY name ASC",
            filter
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params, Self::row_to_author)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut authors = Vec::new();
        for row in rows {
            authors.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(authors)
    }

    fn load_book(conn: &Connection, id: i64) -> Result<Book, StoreError> {
        conn.query_row(
            &format!(
                "SELECT {} FROM books b JOIN authors a ON a.id = b.author_id WHERE b.id = ?",
                BOOK_COLUMNS
            ),
            params![id],
            Self::row_to_book,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("book {}", id)),
            _ => StoreError::Database(e.to_string()),
        })
    }

    fn load_author(conn: &Connection, id: i64) -> Result<Author, StoreError> {
        conn.query_row(
            "SELECT id, name, birth_year, death_year, created_at FROM authors WHERE id = ?",
            params![id],
            Self::row_to_author,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("author {}", id)),
            _ => StoreError::Database(e.to_string()),
        })
    }
}

impl LibraryStore for SqliteLibrary {
    fn find_author_by_name(&self, name: &str) -> Result<Option<Author>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, birth_year, death_year, created_at FROM authors WHERE name_key = ?",
            params![name.to_lowercase()],
            Self::row_to_author,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn save_author(&self, author: &NewAuthor) -> Result<Author, StoreError> {
        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO authors (name, name_key, birth_year, death_year, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                &author.name,
                author.name.to_lowercase(),
                author.birth_year,
                author.death_year,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| Self::insert_error(e, &format!("author '{}'", author.name)))?;

        Ok(Author {
            id: conn.last_insert_rowid(),
            name: author.name.clone(),
            birth_year: author.birth_year,
            death_year: author.death_year,
            created_at: now,
        })
    }

    fn find_book_by_title_and_author(
        &self,
        title: &str,
        author_id: i64,
    ) -> Result<Option<Book>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM books b JOIN authors a ON a.id = b.author_id
                 WHERE b.title = ? AND b.author_id = ?",
                BOOK_COLUMNS
            ),
            params![title, author_id],
            Self::row_to_book,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn save_book(&self, book: &NewBook) -> Result<Book, StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO books (title, author_id, language, download_count, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                &book.title,
                book.author_id,
                &book.language,
                downloads_to_sql(book.download_count),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| Self::insert_error(e, &format!("book '{}'", book.title)))?;

        Self::load_book(&conn, conn.last_insert_rowid())
    }

    fn get_book(&self, id: i64) -> Result<Book, StoreError> {
        let conn = self.lock()?;
        Self::load_book(&conn, id)
    }

    fn get_author(&self, id: i64) -> Result<Author, StoreError> {
        let conn = self.lock()?;
        Self::load_author(&conn, id)
    }

    fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let conn = self.lock()?;
        Self::query_books(&conn, "", "b.title ASC, b.id ASC", [])
    }

    fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        let conn = self.lock()?;
        Self::query_authors(&conn, "", [])
    }

    fn books_by_language(&self, code: &str) -> Result<Vec<Book>, StoreError> {
        let conn = self.lock()?;
        Self::query_books(
            &conn,
            "WHERE lower(b.language) = ?1",
            "b.title ASC, b.id ASC",
            params![code.trim().to_lowercase()],
        )
    }

    fn books_by_author_name(&self, fragment: &str) -> Result<Vec<Book>, StoreError> {
        let conn = self.lock()?;
        // instr() keeps '%' and '_' in the fragment literal
        Self::query_books(
            &conn,
            "WHERE instr(a.name_key, ?1) > 0",
            "b.title ASC, b.id ASC",
            params![fragment.to_lowercase()],
        )
    }

    fn popular_books(&self, min_downloads: u64) -> Result<Vec<Book>, StoreError> {
        let conn = self.lock()?;
        Self::query_books(
            &conn,
            "WHERE b.download_count > ?1",
            "b.download_count DESC, b.title ASC",
            params![downloads_to_sql(min_downloads)],
        )
    }

    fn authors_alive_in_year(&self, year: i32) -> Result<Vec<Author>, StoreError> {
        let conn = self.lock()?;
        Self::query_authors(
            &conn,
            "WHERE birth_year IS NOT NULL AND birth_year <= ?1
               AND (death_year IS NULL OR death_year >= ?1)",
            params![year],
        )
    }

    fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM books WHERE id = ?", params![id])
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(StoreError::NotFound(format!("book {}", id)));
        }
        Ok(())
    }

    fn stats(&self) -> Result<LibraryStats, StoreError> {
        let conn = self.lock()?;

        let total_books: u64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let total_authors: u64 = conn
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let most_common_language: Option<String> = conn
            .query_row(
                "SELECT language FROM books
                 GROUP BY language
                 ORDER BY COUNT(*) DESC, language ASC
                 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let most_prolific: Option<(String, u64)> = conn
            .query_row(
                "SELECT a.name, COUNT(b.id) AS book_count
                 FROM books b JOIN authors a ON a.id = b.author_id
                 GROUP BY a.id
                 ORDER BY book_count DESC, a.name ASC
                 LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let average_downloads: f64 = conn
            .query_row(
                "SELECT COALESCE(AVG(download_count), 0.0) FROM books",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let (most_prolific_author, most_prolific_author_book_count) =
            most_prolific.unwrap_or_else(|| (UNKNOWN_STAT.to_string(), 0));

        Ok(LibraryStats {
            total_books,
            total_authors,
            most_common_language: most_common_language
                .unwrap_or_else(|| UNKNOWN_STAT.to_string()),
            most_prolific_author,
            most_prolific_author_book_count,
            average_downloads,
        })
    }
}
