//! Page requests, page results and navigation links for collection endpoints.
//!
//! Every paginated collection in the service speaks the same contract: a
//! [`PageRequest`] selects a slice, a [`PageDescriptor`] summarises the
//! slice, and [`build_pagination_links`] turns the descriptor into
//! `self`/`first`/`prev`/`next`/`last` links plus an HTTP `Link` header. The
//! builder knows nothing about the entity being paginated; it only needs the
//! endpoint name and the page math.
//!
//! # Examples
//! ```
//! use pico_core::{EndpointRegistry, LinkHeaderStyle, PageDescriptor, build_pagination_links};
//!
//! let registry = EndpointRegistry::library_defaults();
//! let descriptor = PageDescriptor {
//!     page: 2,
//!     items_per_page: 10,
//!     total_pages: 3,
//!     has_prev: true,
//!     has_next: true,
//! };
//! let (links, header) = build_pagination_links(
//!     &registry,
//!     &descriptor,
//!     "bookmark_books",
//!     &[],
//!     LinkHeaderStyle::Legacy,
//! )?;
//! assert_eq!(links.next.as_deref(), Some("/api/v1/bookmarks/books?page=3&per_page=10"));
//! assert!(header.starts_with("</api/v1/bookmarks/books?page=2&per_page=10>; rel=self"));
//! # Ok::<(), pico_core::PaginationError>(())
//! ```

use std::num::NonZeroU32;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod links;
mod routes;

pub use links::{LinkHeaderStyle, NavLinks, build_pagination_links};
pub use routes::EndpointRegistry;

/// Page number used when a caller does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when a caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Errors raised while building navigation links.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// No route template is registered under the endpoint name.
    #[error("no route is registered for endpoint '{endpoint}'")]
    UnknownEndpoint {
        /// Requested endpoint name.
        endpoint: String,
    },
    /// The route template needs a path parameter the caller did not supply.
    #[error("endpoint '{endpoint}' requires path parameter '{parameter}'")]
    MissingPathParameter {
        /// Endpoint whose template was being filled.
        endpoint: String,
        /// Name of the missing placeholder.
        parameter: String,
    },
    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{base}'")]
    InvalidBaseUrl {
        /// The rejected base URL.
        base: String,
        /// Source error from `url`.
        #[source]
        source: url::ParseError,
    },
    /// The configured base URL cannot carry a path (for example `mailto:`).
    #[error("base URL '{base}' cannot carry a path")]
    CannotBeABase {
        /// The rejected base URL.
        base: String,
    },
}

/// Errors raised when a page request is not made of positive integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// `page` was zero.
    #[error("page must be a positive integer")]
    ZeroPage,
    /// `per_page` was zero.
    #[error("per_page must be a positive integer")]
    ZeroPerPage,
}

/// A validated request for one page of a collection.
///
/// Both numbers are positive by construction, so code receiving a
/// `PageRequest` never re-checks them.
///
/// # Examples
/// ```
/// use pico_core::PageRequest;
///
/// let request = PageRequest::new(3, 10)?;
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.end(), 30);
/// assert!(PageRequest::new(0, 10).is_err());
/// # Ok::<(), pico_core::PageRequestError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: NonZeroU32,
    per_page: NonZeroU32,
}

impl PageRequest {
    /// Validate raw numbers into a request.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when either value is zero.
    pub fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        let page_number = NonZeroU32::new(page).ok_or(PageRequestError::ZeroPage)?;
        let page_size = NonZeroU32::new(per_page).ok_or(PageRequestError::ZeroPerPage)?;
        Ok(Self::from_non_zero(page_number, page_size))
    }

    /// Build a request from values already known to be positive.
    #[must_use]
    pub const fn from_non_zero(page: NonZeroU32, per_page: NonZeroU32) -> Self {
        Self { page, per_page }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page.get()
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(self) -> u32 {
        self.per_page.get()
    }

    /// Index of the first item on the page: `(page - 1) * per_page`.
    #[must_use]
    pub fn offset(self) -> usize {
        to_usize(self.page() - 1).saturating_mul(to_usize(self.per_page()))
    }

    /// Index one past the last item on the page: `offset + per_page`.
    #[must_use]
    pub fn end(self) -> usize {
        self.offset().saturating_add(to_usize(self.per_page()))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_non_zero(
            NonZeroU32::MIN,
            NonZeroU32::MIN.saturating_add(DEFAULT_PER_PAGE - 1),
        )
    }
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Summary of one page that the link builder consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageDescriptor {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub items_per_page: u32,
    /// Page number the `last` link points at.
    pub total_pages: u32,
    /// Whether a `prev` link is emitted.
    pub has_prev: bool,
    /// Whether a `next` link is emitted.
    pub has_next: bool,
}

/// One page of a collection along with the total item count.
///
/// Page counts follow the usual ceiling rule: `total_pages =
/// ceil(total_items / per_page)`, which is zero for an empty collection.
/// `has_next` holds while `page < total_pages`.
///
/// # Examples
/// ```
/// use pico_core::{Page, PageRequest};
///
/// let request = PageRequest::new(2, 10)?;
/// let page = Page::new(vec!["k"; 10], request, 25);
/// assert_eq!(page.total_pages(), 3);
/// assert!(page.has_prev());
/// assert!(page.has_next());
/// # Ok::<(), pico_core::PageRequestError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Number of items across all pages.
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Wrap a slice of items fetched for `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total_items,
        }
    }

    /// Number of pages needed to hold every item.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.per_page.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Summarise the page for the link builder.
    #[must_use]
    pub fn descriptor(&self) -> PageDescriptor {
        PageDescriptor {
            page: self.page,
            items_per_page: self.per_page,
            total_pages: self.total_pages(),
            has_prev: self.has_prev(),
            has_next: self.has_next(),
        }
    }
}
