//! Facade crate for the Pico Library scoring core.
//!
//! This crate re-exports the domain records, repository traits and pagination
//! builder from `pico-core`, and the scoring, popularity and recommendation
//! APIs from `pico-scorer` behind feature flags.

#![forbid(unsafe_code)]

pub use pico_core::{
    Book, Bookmark, BookmarkStatus, Bookshelf, CatalogStore, Comment, CommentType, EndpointRegistry,
    LinkHeaderStyle, NavLinks, Page, PageDescriptor, PageRequest, PageRequestError, PaginationError,
    PopularityWriter, Subject, User, WeightedTag, build_pagination_links,
};

#[cfg(feature = "store-sqlite")]
pub use pico_core::{SqliteCatalogError, SqliteCatalogStore};

#[cfg(feature = "scorer")]
pub use pico_scorer::{
    CatalogAggregates, PopularityError, PrecomputationReport, RecommendConfig, RecommendError,
    Recommendations, ScoredBook, TotalPagesPolicy, affinity_score, popularity_score, recommend,
    recommend_for_public_id, review_score, run_popularity_precomputation,
};

#[cfg(feature = "test-support")]
pub use pico_core::test_support;
