//! Scoring and ranking for the Pico Library catalog.
//!
//! The crate provides three layers over the `pico-core` repository traits:
//! - **Scoring primitives**: [`review_score`], [`popularity_score`] and
//!   [`affinity_score`] are pure functions over catalog records. Catalog-wide
//!   maxima travel explicitly as [`CatalogAggregates`].
//! - **Offline popularity precomputation**: [`run_popularity_precomputation`]
//!   recomputes each book's cached popularity score and writes it back one
//!   book at a time.
//! - **Request-time recommendations**: [`recommend`] re-ranks a window of
//!   popular, unread candidates by affinity and slices out one page whose
//!   [`Recommendations::descriptor`] feeds the pagination link builder.
//!
//! # Examples
//!
//! ```
//! use pico_core::{Book, Subject};
//! use pico_scorer::{CatalogAggregates, affinity_score, popularity_score};
//!
//! let book = Book::new(1, "Dune")
//!     .with_downloads(1_000)
//!     .with_subject(Subject::new(2, "Science fiction", 1.5));
//! let aggregates = CatalogAggregates::new(50, 1_000);
//! let score = popularity_score(&book, 50, &aggregates);
//! assert!((score - 100.0).abs() < 1e-9);
//! assert_eq!(affinity_score(None, &book), 1.5);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod popularity;
mod primitives;
mod recommend;

pub use error::{PopularityError, RecommendError};
pub use popularity::{PrecomputationReport, run_popularity_precomputation};
pub use primitives::{
    CatalogAggregates, MAX_POPULARITY, affinity_score, popularity_score, review_score,
};
pub use recommend::{
    DEFAULT_CANDIDATE_WINDOW, RecommendConfig, Recommendations, ScoredBook, TotalPagesPolicy,
    recommend, recommend_for_public_id,
};

#[cfg(test)]
mod tests;
