//! Repository traits over the relational catalog.
//!
//! [`CatalogStore`] is the read-only query surface the scoring core needs;
//! [`PopularityWriter`] is the single write it performs. Keeping the two
//! apart lets request-time code hold a read-only store while only the batch
//! job receives a writer.

use crate::{Book, Bookmark, BookmarkStatus, Comment, Page, PageRequest, User};

#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteCatalogError, SqliteCatalogStore};

/// Read-only access to catalog records.
///
/// Books are returned with their subjects, bookshelves and languages
/// populated. Failures are reported through the implementation's error type
/// and are never retried here.
pub trait CatalogStore {
    /// Error raised when the underlying storage fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return every book in the catalog.
    fn books(&self) -> Result<Vec<Book>, Self::Error>;

    /// Return one book, if it exists.
    fn book(&self, book_id: u64) -> Result<Option<Book>, Self::Error>;

    /// Number of bookmarks, across all users, on one book.
    fn bookmark_count_for_book(&self, book_id: u64) -> Result<u64, Self::Error>;

    /// Number of bookmarks in the whole catalog.
    fn total_bookmark_count(&self) -> Result<u64, Self::Error>;

    /// Highest download count of any book, or zero for an empty catalog.
    fn max_downloads(&self) -> Result<u64, Self::Error>;

    /// Review-type comments left on a book.
    fn review_comments(&self, book_id: u64) -> Result<Vec<Comment>, Self::Error>;

    /// Every bookmark owned by a user.
    fn bookmarks_for_user(&self, user_id: u64) -> Result<Vec<Bookmark>, Self::Error>;

    /// One page of the bookmarks left on a book by any user, ordered by
    /// bookmark id.
    fn bookmarks_for_book(
        &self,
        book_id: u64,
        request: PageRequest,
    ) -> Result<Page<Bookmark>, Self::Error>;

    /// Resolve a user from the public identifier carried in access tokens.
    fn user_by_public_id(&self, public_id: &str) -> Result<Option<User>, Self::Error>;

    /// Books the user has not bookmarked, ordered by cached popularity
    /// (highest first) and truncated to `limit`.
    ///
    /// When `language` is set only books tagged with that language code are
    /// returned.
    fn unbookmarked_books(
        &self,
        user_id: u64,
        language: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Book>, Self::Error>;

    /// One page of the books a user bookmarked, ordered by book id.
    ///
    /// When `status` is set only books whose bookmark, owned by this user,
    /// carries that status are listed.
    fn bookmarked_books(
        &self,
        user_id: u64,
        status: Option<BookmarkStatus>,
        request: PageRequest,
    ) -> Result<Page<Book>, Self::Error>;
}

/// The one write the scoring core performs.
pub trait PopularityWriter {
    /// Error raised when the underlying storage fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Overwrite a book's cached popularity score.
    ///
    /// Each call must be atomic on its own: a batch interrupted part-way
    /// leaves earlier books updated and later books untouched.
    fn set_popularity_score(&mut self, book_id: u64, score: f64) -> Result<(), Self::Error>;
}
