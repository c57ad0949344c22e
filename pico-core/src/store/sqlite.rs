//! SQLite-backed catalog store.
//!
//! The schema mirrors the relational catalog closely enough for the scoring
//! core: books with their subject, bookshelf and language links, users with
//! their followed tags, review tallies and bookmarks. CRUD beyond
//! [`SqliteCatalogStore::initialise_schema`] is left to the owning service.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::debug;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use thiserror::Error;

use crate::{
    Book, Bookmark, BookmarkStatus, Bookshelf, Comment, CommentType, Page, PageRequest,
    ParseBookmarkStatusError, Subject, User,
};

use super::{CatalogStore, PopularityWriter};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    downloads INTEGER NOT NULL DEFAULT 0,
    rating REAL,
    popularity_score REAL NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS books_popularity ON books (popularity_score DESC);
CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    score REAL NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS bookshelves (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    score REAL NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS languages (
    id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS book_subjects (
    book_id INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES subjects (id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, subject_id)
);
CREATE TABLE IF NOT EXISTS book_bookshelves (
    book_id INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    bookshelf_id INTEGER NOT NULL REFERENCES bookshelves (id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, bookshelf_id)
);
CREATE TABLE IF NOT EXISTS book_languages (
    book_id INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    language_id INTEGER NOT NULL REFERENCES languages (id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, language_id)
);
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    public_id TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS user_subjects (
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES subjects (id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, subject_id)
);
CREATE TABLE IF NOT EXISTS user_bookshelves (
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    bookshelf_id INTEGER NOT NULL REFERENCES bookshelves (id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, bookshelf_id)
);
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY,
    book_id INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    rating REAL NOT NULL DEFAULT 0,
    upvotes INTEGER NOT NULL DEFAULT 0,
    downvotes INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS comments_book ON comments (book_id);
CREATE TABLE IF NOT EXISTS bookmarks (
    id INTEGER PRIMARY KEY,
    book_id INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    UNIQUE (book_id, user_id)
);
CREATE INDEX IF NOT EXISTS bookmarks_user ON bookmarks (user_id);
";

const BOOK_COLUMNS: &str = "b.id, b.title, b.downloads, b.rating, b.popularity_score";

const BOOK_SUBJECTS_SQL: &str = "SELECT s.id, s.name, s.score FROM subjects AS s
     JOIN book_subjects AS bs ON bs.subject_id = s.id
     WHERE bs.book_id = ?1 ORDER BY s.id";
const BOOK_BOOKSHELVES_SQL: &str = "SELECT s.id, s.name, s.score FROM bookshelves AS s
     JOIN book_bookshelves AS bs ON bs.bookshelf_id = s.id
     WHERE bs.book_id = ?1 ORDER BY s.id";
const BOOK_LANGUAGES_SQL: &str = "SELECT l.code FROM languages AS l
     JOIN book_languages AS bl ON bl.language_id = l.id
     WHERE bl.book_id = ?1 ORDER BY l.code";
const BOOKMARKED_FILTER: &str = "EXISTS (
         SELECT 1 FROM bookmarks AS bm
         WHERE bm.book_id = b.id AND bm.user_id = ?1
           AND (?2 IS NULL OR lower(bm.status) = ?2)
     )";

/// Errors raised while reading or updating the SQLite catalog.
#[derive(Debug, Error)]
pub enum SqliteCatalogError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the catalog schema failed.
    #[error("failed to initialise the catalog schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Preparing or executing a query failed.
    #[error("failed to query {operation}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored identifier was negative.
    #[error("{entity} id {id} is outside the supported range")]
    IdOutOfRange {
        /// Kind of record the identifier belongs to.
        entity: &'static str,
        /// Identifier read from SQLite.
        id: i64,
    },
    /// An identifier does not fit SQLite's signed 64-bit integers.
    #[error("{entity} id {id} exceeds SQLite i64 range")]
    IdTooLarge {
        /// Kind of record the identifier belongs to.
        entity: &'static str,
        /// Identifier supplied by the caller.
        id: u64,
    },
    /// A stored counter was negative or too large for its type.
    #[error("{column} value {value} is outside the supported range")]
    CountOutOfRange {
        /// Column holding the counter.
        column: &'static str,
        /// Raw value read from SQLite.
        value: i64,
    },
    /// A counter does not fit SQLite's signed 64-bit integers.
    #[error("{column} value {value} exceeds SQLite i64 range")]
    CountTooLarge {
        /// Column the counter is written to.
        column: &'static str,
        /// Value supplied by the caller.
        value: u64,
    },
    /// A stored bookmark status is not one of the known statuses.
    #[error("bookmark {bookmark_id} has an invalid status")]
    InvalidBookmarkStatus {
        /// Identifier of the affected bookmark.
        bookmark_id: u64,
        /// Parse failure.
        #[source]
        source: ParseBookmarkStatusError,
    },
    /// A popularity update targeted a book that does not exist.
    #[error("book {book_id} does not exist")]
    UnknownBook {
        /// Identifier of the missing book.
        book_id: u64,
    },
}

/// Catalog store backed by a single SQLite connection.
pub struct SqliteCatalogStore {
    connection: Connection,
}

impl fmt::Debug for SqliteCatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteCatalogStore")
            .field("path", &self.connection.path())
            .finish_non_exhaustive()
    }
}

impl SqliteCatalogStore {
    /// Open a read-write store, creating the database file when missing.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError::OpenDatabase`] when SQLite cannot open
    /// the file or enable foreign keys.
    pub fn open<P: AsRef<Path>>(database_path: P) -> Result<Self, SqliteCatalogError> {
        let path = database_path.as_ref();
        let connection = Connection::open(path).map_err(|source| SqliteCatalogError::OpenDatabase {
            path: path.to_path_buf(),
            source,
        })?;
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(|source| SqliteCatalogError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("opened catalog database at {}", path.display());
        Ok(Self { connection })
    }

    /// Open a store that rejects writes, for request-time ranking.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError::OpenDatabase`] when the file is missing
    /// or unreadable.
    pub fn open_read_only<P: AsRef<Path>>(database_path: P) -> Result<Self, SqliteCatalogError> {
        let path = database_path.as_ref();
        let connection = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteCatalogError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { connection })
    }

    /// Wrap an existing connection, for callers that manage their own.
    #[must_use]
    pub const fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    /// Borrow the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Create every catalog table and index that does not exist yet.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError::CreateSchema`] when SQLite rejects the
    /// statements, for example on a read-only connection.
    pub fn initialise_schema(&self) -> Result<(), SqliteCatalogError> {
        self.connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteCatalogError::CreateSchema { source })?;
        debug!("catalog schema is in place");
        Ok(())
    }

    fn hydrate(&self, row: BookRow) -> Result<Book, SqliteCatalogError> {
        let id = from_sql_id("book", row.id)?;
        let downloads = u64::try_from(row.downloads).map_err(|_| {
            SqliteCatalogError::CountOutOfRange {
                column: "books.downloads",
                value: row.downloads,
            }
        })?;
        Ok(Book {
            id,
            title: row.title,
            downloads,
            rating: row.rating,
            popularity_score: row.popularity_score,
            subjects: self.tags_of(row.id, BOOK_SUBJECTS_SQL, "book subjects", |id, name, score| {
                Subject::new(id, name, score)
            })?,
            bookshelves: self.tags_of(
                row.id,
                BOOK_BOOKSHELVES_SQL,
                "book bookshelves",
                |id, name, score| Bookshelf::new(id, name, score),
            )?,
            languages: self.languages_of(row.id)?,
        })
    }

    fn tags_of<T>(
        &self,
        book_id: i64,
        sql: &str,
        operation: &'static str,
        build: fn(u64, String, f64) -> T,
    ) -> Result<Vec<T>, SqliteCatalogError> {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(query_error(operation))?;
        let rows = statement
            .query_map([book_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .map_err(query_error(operation))?;

        let mut tags = Vec::new();
        for row in rows {
            let (raw_id, name, score) = row.map_err(query_error(operation))?;
            tags.push(build(from_sql_id("tag", raw_id)?, name, score));
        }
        Ok(tags)
    }

    fn languages_of(&self, book_id: i64) -> Result<Vec<String>, SqliteCatalogError> {
        let mut statement = self
            .connection
            .prepare_cached(BOOK_LANGUAGES_SQL)
            .map_err(query_error("prepare book languages"))?;
        let rows = statement
            .query_map([book_id], |row| row.get::<_, String>(0))
            .map_err(query_error("book languages"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query_error("read book language row"))
    }

    fn load_books(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &'static str,
    ) -> Result<Vec<Book>, SqliteCatalogError> {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(query_error(operation))?;
        let rows = statement
            .query_map(params, BookRow::from_row)
            .map_err(query_error(operation))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error(operation))?;
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn count(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &'static str,
    ) -> Result<u64, SqliteCatalogError> {
        let raw: i64 = self
            .connection
            .query_row(sql, params, |row| row.get(0))
            .map_err(query_error(operation))?;
        u64::try_from(raw).map_err(|_| SqliteCatalogError::CountOutOfRange {
            column: operation,
            value: raw,
        })
    }

    fn interest_ids(
        &self,
        sql: &str,
        user_id: i64,
        operation: &'static str,
    ) -> Result<Vec<u64>, SqliteCatalogError> {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(query_error(operation))?;
        let rows = statement
            .query_map([user_id], |row| row.get::<_, i64>(0))
            .map_err(query_error(operation))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(from_sql_id("tag", row.map_err(query_error(operation))?)?);
        }
        Ok(ids)
    }

    fn load_bookmarks(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &'static str,
    ) -> Result<Vec<Bookmark>, SqliteCatalogError> {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(query_error(operation))?;
        let rows = statement
            .query_map(params, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(query_error(operation))?;

        let mut bookmarks = Vec::new();
        for row in rows {
            let (raw_id, raw_book, raw_user, status) =
                row.map_err(query_error("read bookmark row"))?;
            let bookmark_id = from_sql_id("bookmark", raw_id)?;
            let parsed = status.parse::<BookmarkStatus>().map_err(|source| {
                SqliteCatalogError::InvalidBookmarkStatus {
                    bookmark_id,
                    source,
                }
            })?;
            bookmarks.push(Bookmark {
                id: bookmark_id,
                book_id: from_sql_id("book", raw_book)?,
                user_id: from_sql_id("user", raw_user)?,
                status: parsed,
            });
        }
        Ok(bookmarks)
    }
}

impl CatalogStore for SqliteCatalogStore {
    type Error = SqliteCatalogError;

    fn books(&self) -> Result<Vec<Book>, Self::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books AS b ORDER BY b.id");
        self.load_books(&sql, [], "all books")
    }

    fn book(&self, book_id: u64) -> Result<Option<Book>, Self::Error> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books AS b WHERE b.id = ?1");
        let id = to_sql_id("book", book_id)?;
        let row = self
            .connection
            .query_row(&sql, [id], BookRow::from_row)
            .optional()
            .map_err(query_error("book by id"))?;
        row.map(|found| self.hydrate(found)).transpose()
    }

    fn bookmark_count_for_book(&self, book_id: u64) -> Result<u64, Self::Error> {
        let id = to_sql_id("book", book_id)?;
        self.count(
            "SELECT COUNT(*) FROM bookmarks WHERE book_id = ?1",
            [id],
            "bookmark count for book",
        )
    }

    fn total_bookmark_count(&self) -> Result<u64, Self::Error> {
        self.count("SELECT COUNT(*) FROM bookmarks", [], "total bookmark count")
    }

    fn max_downloads(&self) -> Result<u64, Self::Error> {
        self.count(
            "SELECT COALESCE(MAX(downloads), 0) FROM books",
            [],
            "max downloads",
        )
    }

    fn review_comments(&self, book_id: u64) -> Result<Vec<Comment>, Self::Error> {
        let id = to_sql_id("book", book_id)?;
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT id, book_id, type, rating, upvotes, downvotes FROM comments
                 WHERE book_id = ?1 AND lower(type) = 'review' ORDER BY id",
            )
            .map_err(query_error("prepare review comments"))?;
        let rows = statement
            .query_map([id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(query_error("review comments"))?;

        let mut comments = Vec::new();
        for row in rows {
            let (raw_id, raw_book, kind, rating, upvotes, downvotes) =
                row.map_err(query_error("read review comment row"))?;
            comments.push(Comment {
                id: from_sql_id("comment", raw_id)?,
                book_id: from_sql_id("book", raw_book)?,
                kind: CommentType::from_stored(&kind),
                rating,
                upvotes: to_vote_count("comments.upvotes", upvotes)?,
                downvotes: to_vote_count("comments.downvotes", downvotes)?,
            });
        }
        Ok(comments)
    }

    fn bookmarks_for_user(&self, user_id: u64) -> Result<Vec<Bookmark>, Self::Error> {
        let id = to_sql_id("user", user_id)?;
        self.load_bookmarks(
            "SELECT id, book_id, user_id, status FROM bookmarks WHERE user_id = ?1 ORDER BY id",
            [id],
            "user bookmarks",
        )
    }

    fn bookmarks_for_book(
        &self,
        book_id: u64,
        request: PageRequest,
    ) -> Result<Page<Bookmark>, Self::Error> {
        let id = to_sql_id("book", book_id)?;
        let total = self.count(
            "SELECT COUNT(*) FROM bookmarks WHERE book_id = ?1",
            [id],
            "book bookmark count",
        )?;
        let limit = i64::from(request.per_page());
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let bookmarks = self.load_bookmarks(
            "SELECT id, book_id, user_id, status FROM bookmarks
             WHERE book_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            params![id, limit, offset],
            "book bookmarks",
        )?;
        Ok(Page::new(bookmarks, request, total))
    }

    fn user_by_public_id(&self, public_id: &str) -> Result<Option<User>, Self::Error> {
        let raw_id: Option<i64> = self
            .connection
            .query_row(
                "SELECT id FROM users WHERE public_id = ?1",
                [public_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error("user by public id"))?;
        let Some(user_row) = raw_id else {
            return Ok(None);
        };

        let mut user = User::new(from_sql_id("user", user_row)?, public_id);
        user.subjects = self
            .interest_ids(
                "SELECT subject_id FROM user_subjects WHERE user_id = ?1",
                user_row,
                "user subjects",
            )?
            .into_iter()
            .collect();
        user.bookshelves = self
            .interest_ids(
                "SELECT bookshelf_id FROM user_bookshelves WHERE user_id = ?1",
                user_row,
                "user bookshelves",
            )?
            .into_iter()
            .collect();
        Ok(Some(user))
    }

    fn unbookmarked_books(
        &self,
        user_id: u64,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Book>, Self::Error> {
        let id = to_sql_id("user", user_id)?;
        let sql_limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books AS b
             WHERE NOT EXISTS (
                 SELECT 1 FROM bookmarks AS bm WHERE bm.book_id = b.id AND bm.user_id = ?1
             )
             AND (?2 IS NULL OR EXISTS (
                 SELECT 1 FROM book_languages AS bl
                 JOIN languages AS l ON l.id = bl.language_id
                 WHERE bl.book_id = b.id AND l.code = ?2
             ))
             ORDER BY b.popularity_score DESC, b.id ASC
             LIMIT ?3"
        );
        self.load_books(&sql, params![id, language, sql_limit], "unbookmarked books")
    }

    fn bookmarked_books(
        &self,
        user_id: u64,
        status: Option<BookmarkStatus>,
        request: PageRequest,
    ) -> Result<Page<Book>, Self::Error> {
        let id = to_sql_id("user", user_id)?;
        let status_text = status.map(BookmarkStatus::as_str);
        let total = self.count(
            &format!("SELECT COUNT(*) FROM books AS b WHERE {BOOKMARKED_FILTER}"),
            params![id, status_text],
            "bookmarked book count",
        )?;
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books AS b WHERE {BOOKMARKED_FILTER}
             ORDER BY b.id LIMIT ?3 OFFSET ?4"
        );
        let limit = i64::from(request.per_page());
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let books = self.load_books(
            &sql,
            params![id, status_text, limit, offset],
            "bookmarked books",
        )?;
        Ok(Page::new(books, request, total))
    }
}

impl PopularityWriter for SqliteCatalogStore {
    type Error = SqliteCatalogError;

    fn set_popularity_score(&mut self, book_id: u64, score: f64) -> Result<(), Self::Error> {
        let id = to_sql_id("book", book_id)?;
        let changed = self
            .connection
            .execute(
                "UPDATE books SET popularity_score = ?1 WHERE id = ?2",
                params![score, id],
            )
            .map_err(query_error("update popularity score"))?;
        if changed == 0 {
            return Err(SqliteCatalogError::UnknownBook { book_id });
        }
        Ok(())
    }
}

struct BookRow {
    id: i64,
    title: String,
    downloads: i64,
    rating: Option<f64>,
    popularity_score: f64,
}

impl BookRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            downloads: row.get(2)?,
            rating: row.get(3)?,
            popularity_score: row.get(4)?,
        })
    }
}

fn query_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> SqliteCatalogError {
    move |source| SqliteCatalogError::Query { operation, source }
}

fn from_sql_id(entity: &'static str, id: i64) -> Result<u64, SqliteCatalogError> {
    u64::try_from(id).map_err(|_| SqliteCatalogError::IdOutOfRange { entity, id })
}

fn to_sql_id(entity: &'static str, id: u64) -> Result<i64, SqliteCatalogError> {
    i64::try_from(id).map_err(|_| SqliteCatalogError::IdTooLarge { entity, id })
}

fn to_vote_count(column: &'static str, value: i64) -> Result<u32, SqliteCatalogError> {
    u32::try_from(value).map_err(|_| SqliteCatalogError::CountOutOfRange { column, value })
}
