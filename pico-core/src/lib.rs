//! Core domain types for the Pico Library scoring core.
//!
//! The crate models the catalog records the scoring and recommendation code
//! reads (books, users, comments, bookmarks and their weighted tags), the
//! repository traits that abstract the relational store, and the pagination
//! builder every collection endpoint shares.
//!
//! # Examples
//!
//! ```
//! use pico_core::{Book, Subject};
//!
//! let book = Book::new(1, "Moby Dick")
//!     .with_downloads(120)
//!     .with_subject(Subject::new(4, "Whaling", 0.5));
//! assert_eq!(book.subjects.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod book;
mod bookmark;
mod comment;
pub mod pagination;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
mod user;

pub use book::{Book, Bookshelf, Subject, WeightedTag};
pub use bookmark::{Bookmark, BookmarkStatus, ParseBookmarkStatusError};
pub use comment::{Comment, CommentType};
pub use pagination::{
    EndpointRegistry, LinkHeaderStyle, NavLinks, Page, PageDescriptor, PageRequest,
    PageRequestError, PaginationError, build_pagination_links,
};
pub use store::{CatalogStore, PopularityWriter};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteCatalogError, SqliteCatalogStore};
pub use user::User;
