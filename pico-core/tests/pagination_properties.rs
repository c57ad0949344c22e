//! Property-based tests for page math and navigation links.
//!
//! # Invariants tested
//!
//! - **Ceiling pages:** `total_pages` is the smallest page count holding every
//!   item.
//! - **Neighbour flags:** `has_prev` holds iff `page > 1`; `has_next` iff the
//!   page is before the last one.
//! - **Link shape:** `prev`/`next` links exist exactly when the flags say so,
//!   and every link carries the requested page size.

use pico_core::{EndpointRegistry, LinkHeaderStyle, Page, PageRequest, build_pagination_links};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the page count is the ceiling of items over page size.
    #[test]
    fn total_pages_is_ceiling(
        total in 0_u64..10_000,
        per_page in 1_u32..=100,
        page in 1_u32..=200,
    ) {
        let request = PageRequest::new(page, per_page).expect("positive request");
        let result: Page<()> = Page::new(Vec::new(), request, total);
        let pages = u64::from(result.total_pages());
        let size = u64::from(per_page);
        prop_assert!(pages * size >= total);
        prop_assert!(pages == 0 || (pages - 1) * size < total);
        prop_assert_eq!(result.has_prev(), page > 1);
        prop_assert_eq!(result.has_next(), u64::from(page) < pages);
    }

    /// Property: links mirror the descriptor's flags and keep the page size.
    #[test]
    fn links_follow_descriptor(
        total in 1_u64..5_000,
        per_page in 1_u32..=50,
        page in 1_u32..=120,
    ) {
        let request = PageRequest::new(page, per_page).expect("positive request");
        let result: Page<()> = Page::new(Vec::new(), request, total);
        let descriptor = result.descriptor();
        let registry = EndpointRegistry::library_defaults();
        let (links, header) = build_pagination_links(
            &registry,
            &descriptor,
            "agents",
            &[],
            LinkHeaderStyle::Rfc8288,
        )
        .expect("registered endpoint");

        prop_assert_eq!(links.prev.is_some(), descriptor.has_prev);
        prop_assert_eq!(links.next.is_some(), descriptor.has_next);
        let per_page_param = format!("per_page={per_page}");
        for (_, url) in links.iter() {
            prop_assert!(url.ends_with(&per_page_param));
        }
        prop_assert_eq!(header.split(", ").count(), links.iter().count());
    }
}
