//! Request-time ranking of unread books for one user.
#![forbid(unsafe_code)]

use std::{collections::BTreeSet, str::FromStr};

use log::debug;
use pico_core::{Book, CatalogStore, PageDescriptor, PageRequest, User};
use serde::{Deserialize, Serialize};

use crate::{RecommendError, affinity_score};

/// Number of popular candidates re-ranked per request by default.
pub const DEFAULT_CANDIDATE_WINDOW: usize = 200;

/// How the page count of a recommendation result is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalPagesPolicy {
    /// `floor(n / per_page) + 1`. Reports one extra, empty page when `n` is
    /// an exact multiple of `per_page`; existing clients rely on it.
    #[default]
    Legacy,
    /// `ceil(n / per_page)`.
    Ceiling,
}

impl TotalPagesPolicy {
    /// Page count for a working set of `working_set_size` books.
    #[must_use]
    #[expect(
        clippy::integer_division,
        reason = "the legacy page count floors the quotient"
    )]
    pub fn total_pages(self, working_set_size: usize, per_page: u32) -> u32 {
        let size = u64::try_from(working_set_size).unwrap_or(u64::MAX);
        let page_size = u64::from(per_page.max(1));
        let pages = match self {
            Self::Legacy => (size / page_size).saturating_add(1),
            Self::Ceiling => size.div_ceil(page_size),
        };
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

impl FromStr for TotalPagesPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "ceiling" => Ok(Self::Ceiling),
            _ => Err(format!("unknown total pages policy '{s}'")),
        }
    }
}

/// Tunables for [`recommend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Maximum number of candidates fetched and re-ranked.
    pub candidate_window: usize,
    /// Page count policy.
    pub total_pages: TotalPagesPolicy,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            candidate_window: DEFAULT_CANDIDATE_WINDOW,
            total_pages: TotalPagesPolicy::default(),
        }
    }
}

/// A candidate book with the affinity it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBook {
    /// The recommended book.
    pub book: Book,
    /// Affinity between the requesting user and the book.
    pub affinity: f64,
}

/// One page of recommendations with its pagination flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Books on the requested page, best match first.
    pub books: Vec<ScoredBook>,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Whether a later page holds books.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
    /// Page count under the configured [`TotalPagesPolicy`].
    pub total_pages: u32,
    /// Number of candidates ranked before slicing.
    pub working_set_size: usize,
}

impl Recommendations {
    /// Summarise the page for the link builder.
    #[must_use]
    pub const fn descriptor(&self) -> PageDescriptor {
        PageDescriptor {
            page: self.page,
            items_per_page: self.per_page,
            total_pages: self.total_pages,
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }
}

/// Rank unread books for `user` and return the requested page.
///
/// Candidates are the user's unbookmarked books, optionally restricted to a
/// language, in cached popularity order and truncated to the configured
/// window. They are re-ordered by affinity with a stable sort, so equal
/// affinities keep popularity order.
///
/// # Errors
/// Returns [`RecommendError::Store`] when the candidate query fails.
///
/// # Examples
/// ```
/// use pico_core::{Book, PageRequest, Subject, User, test_support::MemoryCatalog};
/// use pico_scorer::{RecommendConfig, recommend};
///
/// let catalog = MemoryCatalog::new()
///     .with_book(Book::new(1, "Popular").with_popularity_score(90.0))
///     .with_book(
///         Book::new(2, "Niche")
///             .with_popularity_score(10.0)
///             .with_subject(Subject::new(5, "Chess", 0.0)),
///     );
/// let reader = User::new(1, "u-1").with_subject_interest(5);
/// let config = RecommendConfig::default();
/// let page = recommend(&catalog, &reader, PageRequest::default(), None, &config)?;
/// let ids: Vec<_> = page.books.iter().map(|scored| scored.book.id).collect();
/// assert_eq!(ids, vec![2, 1]);
/// assert!(!page.has_next);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn recommend<S: CatalogStore>(
    store: &S,
    user: &User,
    request: PageRequest,
    language: Option<&str>,
    config: &RecommendConfig,
) -> Result<Recommendations, RecommendError<S::Error>> {
    let candidates = store
        .unbookmarked_books(user.id, language, config.candidate_window)
        .map_err(|source| RecommendError::Store {
            operation: "recommendation candidates",
            source,
        })?;

    let mut seen = BTreeSet::new();
    let mut ranked: Vec<ScoredBook> = candidates
        .into_iter()
        .take(config.candidate_window)
        .filter(|book| seen.insert(book.id))
        .map(|book| ScoredBook {
            affinity: affinity_score(Some(user), &book),
            book,
        })
        .collect();
    ranked.sort_by(|a, b| b.affinity.total_cmp(&a.affinity));

    let working_set_size = ranked.len();
    let start = request.offset();
    let end = request.end();
    debug!(
        "ranked {working_set_size} candidates for user {}; serving [{start}, {end})",
        user.id
    );
    let books = ranked
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();

    Ok(Recommendations {
        books,
        page: request.page(),
        per_page: request.per_page(),
        has_next: working_set_size > end,
        has_prev: request.page() > 1,
        total_pages: config
            .total_pages
            .total_pages(working_set_size, request.per_page()),
        working_set_size,
    })
}

/// Resolve `public_id` to a user and rank recommendations for them.
///
/// # Errors
/// Returns [`RecommendError::UnknownUser`] when no user carries the
/// identifier, and [`RecommendError::Store`] when a query fails.
pub fn recommend_for_public_id<S: CatalogStore>(
    store: &S,
    public_id: &str,
    request: PageRequest,
    language: Option<&str>,
    config: &RecommendConfig,
) -> Result<Recommendations, RecommendError<S::Error>> {
    let user = store
        .user_by_public_id(public_id)
        .map_err(|source| RecommendError::Store {
            operation: "user by public id",
            source,
        })?
        .ok_or_else(|| RecommendError::UnknownUser {
            public_id: public_id.to_owned(),
        })?;
    recommend(store, &user, request, language, config)
}
