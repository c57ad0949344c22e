//! Offline recomputation of every book's cached popularity score.
#![forbid(unsafe_code)]

use log::{debug, info, warn};
use pico_core::{Book, CatalogStore, PopularityWriter};
use serde::{Deserialize, Serialize};

use crate::{CatalogAggregates, PopularityError, affinity_score, popularity_score, review_score};

/// Summary of one precomputation run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecomputationReport {
    /// Number of books whose score was written.
    pub books_scored: usize,
    /// Lowest score written, if any book was scored.
    pub min_score: Option<f64>,
    /// Highest score written, if any book was scored.
    pub max_score: Option<f64>,
    /// Aggregates the run normalised against.
    pub aggregates: Option<CatalogAggregates>,
}

impl PrecomputationReport {
    fn record(&mut self, score: f64) {
        self.books_scored = self.books_scored.saturating_add(1);
        self.min_score = Some(self.min_score.map_or(score, |low| low.min(score)));
        self.max_score = Some(self.max_score.map_or(score, |high| high.max(score)));
    }
}

/// Recompute and persist the cached popularity score of every book.
///
/// Each book receives `affinity_score(None, book) + review_score(book) +
/// popularity_score(book)`. The catalog aggregates are read once, before the
/// first book is scored. Writes happen one book at a time, so a failure
/// leaves earlier books updated and later books untouched.
///
/// The job takes no lock; callers must schedule it as a singleton.
///
/// # Errors
/// Returns [`PopularityError`] naming the failed operation when the store
/// cannot be read or a score cannot be written.
///
/// # Examples
/// ```
/// use pico_core::{Book, CatalogStore, test_support::MemoryCatalog};
/// use pico_scorer::run_popularity_precomputation;
///
/// let mut catalog = MemoryCatalog::new()
///     .with_book(Book::new(1, "Emma").with_downloads(40))
///     .with_book(Book::new(2, "Persuasion").with_downloads(10));
/// let report = run_popularity_precomputation(&mut catalog)?;
/// assert_eq!(report.books_scored, 2);
/// let emma = catalog.book(1)?.expect("book exists");
/// assert!(emma.popularity_score > 0.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn run_popularity_precomputation<S, E>(
    store: &mut S,
) -> Result<PrecomputationReport, PopularityError<E>>
where
    S: CatalogStore<Error = E> + PopularityWriter<Error = E>,
{
    let aggregates =
        CatalogAggregates::from_store(store).map_err(|source| PopularityError::Store {
            operation: "catalog aggregates",
            source,
        })?;
    let books = store.books().map_err(|source| PopularityError::Store {
        operation: "books",
        source,
    })?;
    info!(
        "recomputing popularity for {} books (max reads {}, max downloads {})",
        books.len(),
        aggregates.max_reads(),
        aggregates.max_downloads()
    );

    let mut report = PrecomputationReport {
        aggregates: Some(aggregates),
        ..PrecomputationReport::default()
    };
    for book in &books {
        let score = score_book(store, book, &aggregates)?;
        store
            .set_popularity_score(book.id, score)
            .map_err(|source| PopularityError::Write {
                book_id: book.id,
                source,
            })?;
        debug!("book {} scored {score:.4}", book.id);
        report.record(score);
    }

    info!("popularity recomputed for {} books", report.books_scored);
    Ok(report)
}

#[expect(clippy::float_arithmetic, reason = "the cached score sums three components")]
fn score_book<S, E>(
    store: &S,
    book: &Book,
    aggregates: &CatalogAggregates,
) -> Result<f64, PopularityError<E>>
where
    S: CatalogStore<Error = E>,
{
    let reviews = store
        .review_comments(book.id)
        .map_err(|source| PopularityError::BookInput {
            book_id: book.id,
            operation: "review comments",
            source,
        })?;
    let bookmarks =
        store
            .bookmark_count_for_book(book.id)
            .map_err(|source| PopularityError::BookInput {
                book_id: book.id,
                operation: "bookmark count",
                source,
            })?;

    let score = affinity_score(None, book)
        + review_score(&reviews)
        + popularity_score(book, bookmarks, aggregates);
    if score.is_finite() {
        Ok(score)
    } else {
        warn!("book {} produced a non-finite score; storing 0", book.id);
        Ok(0.0)
    }
}
