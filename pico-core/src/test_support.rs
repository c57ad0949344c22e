//! In-memory catalog used by unit and behaviour tests.
//!
//! [`MemoryCatalog`] answers every [`CatalogStore`] query with linear scans
//! and keeps popularity writes in memory. With the `store-sqlite` feature,
//! [`write_sqlite_catalog`] persists the same records to a database file so
//! scenarios can exercise the SQLite store against identical data.

use thiserror::Error;

use crate::{
    Book, Bookmark, BookmarkStatus, CatalogStore, Comment, CommentType, Page, PageRequest,
    PopularityWriter, User,
};

/// Errors produced by [`MemoryCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryCatalogError {
    /// The catalog was configured to reject writes for this book.
    #[error("popularity write rejected for book {book_id}")]
    WriteRejected {
        /// Book whose write failed.
        book_id: u64,
    },
    /// A popularity update targeted a book that does not exist.
    #[error("book {book_id} does not exist")]
    UnknownBook {
        /// Identifier of the missing book.
        book_id: u64,
    },
}

/// Catalog held entirely in memory.
///
/// Intended for small datasets; every query walks the full record lists.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    books: Vec<Book>,
    users: Vec<User>,
    comments: Vec<Comment>,
    bookmarks: Vec<Bookmark>,
    rejected_writes: Vec<u64>,
    writes: Vec<(u64, f64)>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book, replacing any book with the same id.
    #[must_use]
    pub fn with_book(mut self, book: Book) -> Self {
        self.books.retain(|existing| existing.id != book.id);
        self.books.push(book);
        self
    }

    /// Add several books.
    #[must_use]
    pub fn with_books<I>(self, books: I) -> Self
    where
        I: IntoIterator<Item = Book>,
    {
        books.into_iter().fold(self, Self::with_book)
    }

    /// Add a user, replacing any user with the same id.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.users.retain(|existing| existing.id != user.id);
        self.users.push(user);
        self
    }

    /// Add a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    /// Add a bookmark, replacing the user's earlier bookmark on the same
    /// book.
    #[must_use]
    pub fn with_bookmark(mut self, bookmark: Bookmark) -> Self {
        self.bookmarks.retain(|existing| {
            existing.book_id != bookmark.book_id || existing.user_id != bookmark.user_id
        });
        self.bookmarks.push(bookmark);
        self
    }

    /// Make popularity writes for `book_id` fail.
    #[must_use]
    pub fn rejecting_writes_for(mut self, book_id: u64) -> Self {
        self.rejected_writes.push(book_id);
        self
    }

    /// Every book currently held, in insertion order.
    #[must_use]
    pub fn all_books(&self) -> &[Book] {
        &self.books
    }

    /// Every user currently held.
    #[must_use]
    pub fn all_users(&self) -> &[User] {
        &self.users
    }

    /// Every comment currently held.
    #[must_use]
    pub fn all_comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Every bookmark currently held.
    #[must_use]
    pub fn all_bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// Successful popularity writes in the order they happened.
    #[must_use]
    pub fn writes(&self) -> &[(u64, f64)] {
        &self.writes
    }

    fn has_bookmark(&self, user_id: u64, book_id: u64) -> bool {
        self.bookmarks
            .iter()
            .any(|mark| mark.user_id == user_id && mark.book_id == book_id)
    }
}

impl CatalogStore for MemoryCatalog {
    type Error = MemoryCatalogError;

    fn books(&self) -> Result<Vec<Book>, Self::Error> {
        let mut books = self.books.clone();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    fn book(&self, book_id: u64) -> Result<Option<Book>, Self::Error> {
        Ok(self.books.iter().find(|book| book.id == book_id).cloned())
    }

    fn bookmark_count_for_book(&self, book_id: u64) -> Result<u64, Self::Error> {
        let count = self
            .bookmarks
            .iter()
            .filter(|mark| mark.book_id == book_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn total_bookmark_count(&self) -> Result<u64, Self::Error> {
        Ok(u64::try_from(self.bookmarks.len()).unwrap_or(u64::MAX))
    }

    fn max_downloads(&self) -> Result<u64, Self::Error> {
        Ok(self
            .books
            .iter()
            .map(|book| book.downloads)
            .max()
            .unwrap_or(0))
    }

    fn review_comments(&self, book_id: u64) -> Result<Vec<Comment>, Self::Error> {
        Ok(self
            .comments
            .iter()
            .filter(|comment| comment.book_id == book_id && comment.kind == CommentType::Review)
            .cloned()
            .collect())
    }

    fn bookmarks_for_user(&self, user_id: u64) -> Result<Vec<Bookmark>, Self::Error> {
        Ok(self
            .bookmarks
            .iter()
            .filter(|mark| mark.user_id == user_id)
            .cloned()
            .collect())
    }

    fn bookmarks_for_book(
        &self,
        book_id: u64,
        request: PageRequest,
    ) -> Result<Page<Bookmark>, Self::Error> {
        let mut matching: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .filter(|mark| mark.book_id == book_id)
            .copied()
            .collect();
        matching.sort_by_key(|mark| mark.id);
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let items = matching
            .into_iter()
            .skip(request.offset())
            .take(request.end().saturating_sub(request.offset()))
            .collect();
        Ok(Page::new(items, request, total))
    }

    fn user_by_public_id(&self, public_id: &str) -> Result<Option<User>, Self::Error> {
        Ok(self
            .users
            .iter()
            .find(|user| user.public_id == public_id)
            .cloned())
    }

    fn unbookmarked_books(
        &self,
        user_id: u64,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Book>, Self::Error> {
        let mut books: Vec<Book> = self
            .books
            .iter()
            .filter(|book| !self.has_bookmark(user_id, book.id))
            .filter(|book| language.is_none_or(|code| book.has_language(code)))
            .cloned()
            .collect();
        books.sort_by(|a, b| {
            b.popularity_score
                .total_cmp(&a.popularity_score)
                .then(a.id.cmp(&b.id))
        });
        books.truncate(limit);
        Ok(books)
    }

    fn bookmarked_books(
        &self,
        user_id: u64,
        status: Option<BookmarkStatus>,
        request: PageRequest,
    ) -> Result<Page<Book>, Self::Error> {
        let mut matching: Vec<Book> = self
            .books
            .iter()
            .filter(|book| {
                self.bookmarks.iter().any(|mark| {
                    mark.user_id == user_id
                        && mark.book_id == book.id
                        && status.is_none_or(|wanted| mark.status == wanted)
                })
            })
            .cloned()
            .collect();
        matching.sort_by_key(|book| book.id);
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let items = matching
            .into_iter()
            .skip(request.offset())
            .take(request.end().saturating_sub(request.offset()))
            .collect();
        Ok(Page::new(items, request, total))
    }
}

impl PopularityWriter for MemoryCatalog {
    type Error = MemoryCatalogError;

    fn set_popularity_score(&mut self, book_id: u64, score: f64) -> Result<(), Self::Error> {
        if self.rejected_writes.contains(&book_id) {
            return Err(MemoryCatalogError::WriteRejected { book_id });
        }
        let book = self
            .books
            .iter_mut()
            .find(|book| book.id == book_id)
            .ok_or(MemoryCatalogError::UnknownBook { book_id })?;
        book.popularity_score = score;
        self.writes.push((book_id, score));
        Ok(())
    }
}

#[cfg(feature = "store-sqlite")]
pub use sqlite::write_sqlite_catalog;

#[cfg(feature = "store-sqlite")]
mod sqlite {
    use std::path::Path;

    use rusqlite::{Connection, params};

    use super::MemoryCatalog;
    use crate::{SqliteCatalogError, SqliteCatalogStore};

    /// Persist a [`MemoryCatalog`] into a fresh SQLite database at `path`
    /// and return a store opened on it.
    ///
    /// Users referenced only by bookmarks, and tags referenced only by user
    /// interests, receive placeholder rows so foreign keys hold.
    ///
    /// # Errors
    /// Returns [`SqliteCatalogError`] when the database cannot be created or
    /// a record cannot be written.
    pub fn write_sqlite_catalog(
        path: &Path,
        catalog: &MemoryCatalog,
    ) -> Result<SqliteCatalogStore, SqliteCatalogError> {
        let store = SqliteCatalogStore::open(path)?;
        store.initialise_schema()?;
        let connection = store.connection();

        for book in catalog.all_books() {
            insert_book(connection, book)?;
        }
        for user in catalog.all_users() {
            let id = sql_id("user", user.id)?;
            run(
                connection,
                "write user",
                "INSERT INTO users (id, public_id) VALUES (?1, ?2)",
                params![id, user.public_id],
            )?;
            for subject in &user.subjects {
                let tag = sql_id("subject", *subject)?;
                run(
                    connection,
                    "write placeholder subject",
                    "INSERT OR IGNORE INTO subjects (id, name) VALUES (?1, 'subject-' || ?1)",
                    params![tag],
                )?;
                run(
                    connection,
                    "write user subject",
                    "INSERT INTO user_subjects (user_id, subject_id) VALUES (?1, ?2)",
                    params![id, tag],
                )?;
            }
            for bookshelf in &user.bookshelves {
                let tag = sql_id("bookshelf", *bookshelf)?;
                run(
                    connection,
                    "write placeholder bookshelf",
                    "INSERT OR IGNORE INTO bookshelves (id, name) VALUES (?1, 'bookshelf-' || ?1)",
                    params![tag],
                )?;
                run(
                    connection,
                    "write user bookshelf",
                    "INSERT INTO user_bookshelves (user_id, bookshelf_id) VALUES (?1, ?2)",
                    params![id, tag],
                )?;
            }
        }
        for comment in catalog.all_comments() {
            run(
                connection,
                "write comment",
                "INSERT INTO comments (id, book_id, type, rating, upvotes, downvotes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    sql_id("comment", comment.id)?,
                    sql_id("book", comment.book_id)?,
                    comment.kind.as_str(),
                    comment.rating,
                    comment.upvotes,
                    comment.downvotes
                ],
            )?;
        }
        for bookmark in catalog.all_bookmarks() {
            let user = sql_id("user", bookmark.user_id)?;
            run(
                connection,
                "write placeholder user",
                "INSERT OR IGNORE INTO users (id, public_id) VALUES (?1, 'user-' || ?1)",
                params![user],
            )?;
            run(
                connection,
                "write bookmark",
                "INSERT INTO bookmarks (id, book_id, user_id, status) VALUES (?1, ?2, ?3, ?4)",
                params![
                    sql_id("bookmark", bookmark.id)?,
                    sql_id("book", bookmark.book_id)?,
                    user,
                    bookmark.status.as_str()
                ],
            )?;
        }
        Ok(store)
    }

    fn insert_book(connection: &Connection, book: &crate::Book) -> Result<(), SqliteCatalogError> {
        let id = sql_id("book", book.id)?;
        let downloads =
            i64::try_from(book.downloads).map_err(|_| SqliteCatalogError::CountTooLarge {
                column: "books.downloads",
                value: book.downloads,
            })?;
        run(
            connection,
            "write book",
            "INSERT INTO books (id, title, downloads, rating, popularity_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, book.title, downloads, book.rating, book.popularity_score],
        )?;
        for subject in &book.subjects {
            let tag = sql_id("subject", subject.id)?;
            run(
                connection,
                "write subject",
                "INSERT INTO subjects (id, name, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT (id) DO UPDATE SET name = excluded.name, score = excluded.score",
                params![tag, subject.name, subject.score],
            )?;
            run(
                connection,
                "link subject",
                "INSERT INTO book_subjects (book_id, subject_id) VALUES (?1, ?2)",
                params![id, tag],
            )?;
        }
        for bookshelf in &book.bookshelves {
            let tag = sql_id("bookshelf", bookshelf.id)?;
            run(
                connection,
                "write bookshelf",
                "INSERT INTO bookshelves (id, name, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT (id) DO UPDATE SET name = excluded.name, score = excluded.score",
                params![tag, bookshelf.name, bookshelf.score],
            )?;
            run(
                connection,
                "link bookshelf",
                "INSERT INTO book_bookshelves (book_id, bookshelf_id) VALUES (?1, ?2)",
                params![id, tag],
            )?;
        }
        for code in &book.languages {
            run(
                connection,
                "write language",
                "INSERT OR IGNORE INTO languages (code) VALUES (?1)",
                params![code],
            )?;
            run(
                connection,
                "link language",
                "INSERT INTO book_languages (book_id, language_id)
                 SELECT ?1, id FROM languages WHERE code = ?2",
                params![id, code],
            )?;
        }
        Ok(())
    }

    fn run(
        connection: &Connection,
        operation: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<(), SqliteCatalogError> {
        connection
            .execute(sql, params)
            .map(|_| ())
            .map_err(|source| SqliteCatalogError::Query { operation, source })
    }

    fn sql_id(entity: &'static str, id: u64) -> Result<i64, SqliteCatalogError> {
        i64::try_from(id).map_err(|_| SqliteCatalogError::IdTooLarge { entity, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Subject;
    use rstest::rstest;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_book(
                Book::new(1, "A")
                    .with_popularity_score(5.0)
                    .with_language("en"),
            )
            .with_book(
                Book::new(2, "B")
                    .with_popularity_score(9.0)
                    .with_language("de"),
            )
            .with_book(
                Book::new(3, "C")
                    .with_popularity_score(9.0)
                    .with_subject(Subject::new(1, "Poetry", 0.1)),
            )
            .with_bookmark(Bookmark::new(1, 1, 7, BookmarkStatus::Read))
    }

    #[rstest]
    fn candidates_break_ties_by_id() {
        let ids: Vec<_> = catalog()
            .unbookmarked_books(7, None, 10)
            .expect("infallible")
            .iter()
            .map(|book| book.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[rstest]
    fn rejected_writes_leave_book_untouched() {
        let mut store = catalog().rejecting_writes_for(2);
        let err = store.set_popularity_score(2, 1.0).expect_err("rejected");
        assert_eq!(err, MemoryCatalogError::WriteRejected { book_id: 2 });
        assert!(store.writes().is_empty());
    }

    #[cfg(feature = "store-sqlite")]
    #[rstest]
    fn oversized_download_count_is_a_count_error() {
        use crate::SqliteCatalogError;

        let dir = tempfile::TempDir::new().expect("tempdir");
        let catalog = MemoryCatalog::new().with_book(Book::new(1, "Huge").with_downloads(u64::MAX));
        let err = write_sqlite_catalog(&dir.path().join("catalog.db"), &catalog)
            .expect_err("downloads exceed i64");
        assert!(matches!(
            err,
            SqliteCatalogError::CountTooLarge {
                column: "books.downloads",
                value: u64::MAX,
            }
        ));
    }

    #[rstest]
    fn book_bookmarks_list_every_reader() {
        let store = catalog()
            .with_bookmark(Bookmark::new(4, 1, 9, BookmarkStatus::WantToRead))
            .with_bookmark(Bookmark::new(3, 2, 9, BookmarkStatus::Read));
        let request = PageRequest::new(1, 10).expect("page request");
        let page = store.bookmarks_for_book(1, request).expect("infallible");
        assert_eq!(page.total_items, 2);
        let ids: Vec<_> = page.items.iter().map(|mark| mark.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[rstest]
    fn rebookmarking_replaces_status() {
        let store = catalog().with_bookmark(Bookmark::new(5, 1, 7, BookmarkStatus::Unread));
        let marks = store.bookmarks_for_user(7).expect("infallible");
        assert_eq!(marks.len(), 1);
        assert_eq!(
            marks.first().map(|m| m.status),
            Some(BookmarkStatus::Unread)
        );
    }
}
