//! Books and the weighted tags (subjects and bookshelves) attached to them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A catalog tag that carries its own scoring weight.
///
/// Subjects and bookshelves share the same affinity rules, so scoring code is
/// written once against this trait.
pub trait WeightedTag {
    /// Identifier used to match the tag against a user's interests.
    fn id(&self) -> u64;

    /// Weight added to a book's affinity whenever the tag is present.
    fn score(&self) -> f64;
}

/// A subject heading such as "Science fiction".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Subject {
    /// Unique identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Weight contributed to affinity scores.
    pub score: f64,
}

impl Subject {
    /// Construct a subject.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, score: f64) -> Self {
        Self {
            id,
            name: name.into(),
            score,
        }
    }
}

impl WeightedTag for Subject {
    fn id(&self) -> u64 {
        self.id
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// A curated bookshelf such as "Best Books Ever Listings".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bookshelf {
    /// Unique identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Weight contributed to affinity scores.
    pub score: f64,
}

impl Bookshelf {
    /// Construct a bookshelf.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, score: f64) -> Self {
        Self {
            id,
            name: name.into(),
            score,
        }
    }
}

impl WeightedTag for Bookshelf {
    fn id(&self) -> u64 {
        self.id
    }

    fn score(&self) -> f64 {
        self.score
    }
}

/// A catalog book together with the relationships scoring needs.
///
/// `popularity_score` is a cached value owned by the popularity
/// precomputation job. Everything else is read-only from this crate's point
/// of view.
///
/// # Examples
/// ```
/// use pico_core::{Book, Bookshelf};
///
/// let book = Book::new(7, "Dracula")
///     .with_rating(4.2)
///     .with_language("en")
///     .with_bookshelf(Bookshelf::new(1, "Gothic Fiction", 1.0));
/// assert_eq!(book.rating, Some(4.2));
/// assert!(book.has_language("en"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Book {
    /// Unique identifier.
    pub id: u64,
    /// Title shown to readers.
    pub title: String,
    /// Number of recorded downloads.
    pub downloads: u64,
    /// Average rating, when one has been recorded.
    pub rating: Option<f64>,
    /// Cached popularity written by the precomputation job.
    pub popularity_score: f64,
    /// Subjects attached to the book.
    pub subjects: Vec<Subject>,
    /// Bookshelves listing the book.
    pub bookshelves: Vec<Bookshelf>,
    /// Language codes the book is available in.
    pub languages: Vec<String>,
}

impl Book {
    /// Construct a book with no downloads, rating or tags.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            downloads: 0,
            rating: None,
            popularity_score: 0.0,
            subjects: Vec::new(),
            bookshelves: Vec::new(),
            languages: Vec::new(),
        }
    }

    /// Set the download count while returning `self` for chaining.
    #[must_use]
    pub const fn with_downloads(mut self, downloads: u64) -> Self {
        self.downloads = downloads;
        self
    }

    /// Set the rating while returning `self` for chaining.
    #[must_use]
    pub const fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Set the cached popularity score while returning `self` for chaining.
    #[must_use]
    pub const fn with_popularity_score(mut self, score: f64) -> Self {
        self.popularity_score = score;
        self
    }

    /// Attach a subject while returning `self` for chaining.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Attach a bookshelf while returning `self` for chaining.
    #[must_use]
    pub fn with_bookshelf(mut self, bookshelf: Bookshelf) -> Self {
        self.bookshelves.push(bookshelf);
        self
    }

    /// Tag the book with a language code while returning `self` for chaining.
    #[must_use]
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.languages.push(code.into());
        self
    }

    /// Report whether the book is available in the given language.
    #[must_use]
    pub fn has_language(&self, code: &str) -> bool {
        self.languages.iter().any(|language| language == code)
    }
}
