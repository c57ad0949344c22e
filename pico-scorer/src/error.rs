//! Error types raised by the popularity job and the recommendation engine.
#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors raised while recomputing cached popularity scores.
///
/// `E` is the error type of the catalog store the job runs against.
#[derive(Debug, Error)]
pub enum PopularityError<E> {
    /// Reading catalog-wide data failed before any book was scored.
    #[error("failed to read {operation}")]
    Store {
        /// Description of the failed read.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: E,
    },
    /// Reading the inputs of one book's score failed.
    #[error("failed to read {operation} for book {book_id}")]
    BookInput {
        /// Book being scored.
        book_id: u64,
        /// Description of the failed read.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: E,
    },
    /// Writing a book's score failed. Earlier books keep their new scores.
    #[error("failed to write popularity score for book {book_id}")]
    Write {
        /// Book whose write failed.
        book_id: u64,
        /// Source error from the store.
        #[source]
        source: E,
    },
}

/// Errors raised while ranking recommendations.
#[derive(Debug, Error)]
pub enum RecommendError<E> {
    /// A store query failed.
    #[error("failed to query {operation}")]
    Store {
        /// Description of the failed query.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: E,
    },
    /// No user carries the given public identifier.
    #[error("no user with public id '{public_id}'")]
    UnknownUser {
        /// Identifier that failed to resolve.
        public_id: String,
    },
}
