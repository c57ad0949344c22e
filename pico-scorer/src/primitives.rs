//! Pure scoring functions shared by the popularity job and the ranking
//! engine.
#![forbid(unsafe_code)]

use pico_core::{Book, CatalogStore, Comment, CommentType, User, WeightedTag};
use serde::{Deserialize, Serialize};

/// Weight given to each of the read and download components.
const COMPONENT_WEIGHT: f64 = 5.0;
/// Scale applied to the summed components, giving a `0..=100` range.
const POPULARITY_SCALE: f64 = 10.0;
/// Upper bound of a popularity score.
pub const MAX_POPULARITY: f64 = 100.0;

/// Catalog-wide maxima that normalise popularity.
///
/// Both fields are at least one, so the logarithmic ratios below never
/// divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAggregates {
    max_reads: u64,
    max_downloads: u64,
}

impl CatalogAggregates {
    /// Build aggregates from raw counts, flooring both at one.
    #[must_use]
    pub fn new(total_bookmarks: u64, max_downloads: u64) -> Self {
        Self {
            max_reads: total_bookmarks.max(1),
            max_downloads: max_downloads.max(1),
        }
    }

    /// Read the aggregates from a store.
    ///
    /// # Errors
    /// Returns the store's error when either count cannot be read.
    pub fn from_store<S: CatalogStore>(store: &S) -> Result<Self, S::Error> {
        let total_bookmarks = store.total_bookmark_count()?;
        let max_downloads = store.max_downloads()?;
        Ok(Self::new(total_bookmarks, max_downloads))
    }

    /// Normaliser for the read component.
    #[must_use]
    pub const fn max_reads(&self) -> u64 {
        self.max_reads
    }

    /// Normaliser for the download component.
    #[must_use]
    pub const fn max_downloads(&self) -> u64 {
        self.max_downloads
    }
}

/// Vote-weighted mean rating of a book's reviews.
///
/// Each review contributes `rating × (upvotes − downvotes)` to the numerator
/// and `upvotes + downvotes` to the denominator. Comments that are not
/// reviews are ignored. A book without votes scores zero.
///
/// # Examples
/// ```
/// use pico_core::Comment;
/// use pico_scorer::review_score;
///
/// let reviews = [Comment::review(1, 9, 4.0, 3, 1), Comment::review(2, 9, 2.0, 0, 0)];
/// assert_eq!(review_score(&reviews), 2.0);
/// assert_eq!(review_score(&[]), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "review scores weight ratings by vote tallies"
)]
pub fn review_score(comments: &[Comment]) -> f64 {
    let (weighted, votes) = comments
        .iter()
        .filter(|comment| comment.kind == CommentType::Review)
        .fold((0.0_f64, 0_u64), |(weighted, votes), comment| {
            (
                weighted + comment.rating * comment.net_votes() as f64,
                votes.saturating_add(comment.total_votes()),
            )
        });
    if votes == 0 {
        return 0.0;
    }
    weighted / votes as f64
}

/// Log-normalised read and download volume of a book, in `0..=100`.
///
/// `bookmark_count` is the number of bookmarks on this book; counts below one
/// are treated as one. Results are clamped so a book whose counts outgrew
/// stale aggregates still lands in range.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "popularity uses logarithmic ratios of bounded counts"
)]
pub fn popularity_score(book: &Book, bookmark_count: u64, aggregates: &CatalogAggregates) -> f64 {
    let num_reads = bookmark_count.max(1) as f64;
    let reads = num_reads.ln_1p() / (aggregates.max_reads as f64).ln_1p();
    let downloads = (book.downloads as f64).ln_1p() / (aggregates.max_downloads as f64).ln_1p();
    let score = POPULARITY_SCALE * (COMPONENT_WEIGHT * reads + COMPONENT_WEIGHT * downloads);
    score.clamp(0.0, MAX_POPULARITY)
}

/// Compatibility between a user's interests and a book.
///
/// Every subject and bookshelf adds its own score, plus one when the user
/// follows it; the book's rating is added when present. Without a user only
/// the tag scores and the rating count.
///
/// # Examples
/// ```
/// use pico_core::{Book, Subject, User};
/// use pico_scorer::affinity_score;
///
/// let book = Book::new(1, "Walden")
///     .with_subject(Subject::new(3, "Nature", 0.5))
///     .with_rating(4.0);
/// let reader = User::new(1, "u-1").with_subject_interest(3);
/// assert_eq!(affinity_score(None, &book), 4.5);
/// assert_eq!(affinity_score(Some(&reader), &book), 5.5);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "affinity sums weighted tags")]
pub fn affinity_score(user: Option<&User>, book: &Book) -> f64 {
    let subjects = tag_affinity(&book.subjects, |subject| {
        user.is_some_and(|reader| reader.is_interested_in_subject(subject))
    });
    let bookshelves = tag_affinity(&book.bookshelves, |bookshelf| {
        user.is_some_and(|reader| reader.is_interested_in_bookshelf(bookshelf))
    });
    subjects + bookshelves + book.rating.unwrap_or(0.0)
}

#[expect(clippy::float_arithmetic, reason = "affinity sums weighted tags")]
fn tag_affinity<T: WeightedTag>(tags: &[T], follows: impl Fn(&T) -> bool) -> f64 {
    tags.iter()
        .map(|tag| {
            let bonus = if follows(tag) { 1.0 } else { 0.0 };
            bonus + tag.score()
        })
        .sum()
}
