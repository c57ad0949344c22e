//! Navigation link sets and the HTTP `Link` header derived from them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{EndpointRegistry, PageDescriptor, PaginationError};

/// How the `Link` header joins its entries.
///
/// `Legacy` reproduces the header existing clients receive: entries of the
/// form `<url>; rel=name` concatenated with no separator. That output is not
/// a valid RFC 8288 header; `Rfc8288` quotes the relation and separates
/// entries with `", "`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LinkHeaderStyle {
    /// Separator-less concatenation kept for wire compatibility.
    #[default]
    Legacy,
    /// Comma-separated entries with quoted relation types.
    Rfc8288,
}

impl std::str::FromStr for LinkHeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "rfc8288" => Ok(Self::Rfc8288),
            _ => Err(format!("unknown link header style '{s}'")),
        }
    }
}

/// Navigation links for one page of a collection.
///
/// `self`, `first` and `last` are always present; `prev` and `next` appear
/// only when the neighbouring page exists.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavLinks {
    /// Link to the current page.
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    pub self_link: String,
    /// Link to page one.
    pub first: String,
    /// Link to the previous page.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub prev: Option<String>,
    /// Link to the next page.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub next: Option<String>,
    /// Link to the final page.
    pub last: String,
}

impl NavLinks {
    /// Build the link set for `descriptor` on `endpoint`.
    ///
    /// # Errors
    /// Propagates [`PaginationError`] from [`EndpointRegistry::url_for`].
    pub fn build(
        registry: &EndpointRegistry,
        descriptor: &PageDescriptor,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Self, PaginationError> {
        let per_page = descriptor.items_per_page;
        let this_page = descriptor.page;
        let url = |page: u32| registry.url_for(endpoint, params, page, per_page);

        let prev = if descriptor.has_prev {
            Some(url(this_page.saturating_sub(1))?)
        } else {
            None
        };
        let next = if descriptor.has_next {
            Some(url(this_page.saturating_add(1))?)
        } else {
            None
        };

        Ok(Self {
            self_link: url(this_page)?,
            first: url(1)?,
            prev,
            next,
            last: url(descriptor.total_pages)?,
        })
    }

    /// Iterate over `(rel, url)` pairs in header order: self, first, prev,
    /// next, last.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            Some(("self", self.self_link.as_str())),
            Some(("first", self.first.as_str())),
            self.prev.as_deref().map(|url| ("prev", url)),
            self.next.as_deref().map(|url| ("next", url)),
            Some(("last", self.last.as_str())),
        ]
        .into_iter()
        .flatten()
    }

    /// Render the HTTP `Link` header value.
    #[must_use]
    pub fn link_header(&self, style: LinkHeaderStyle) -> String {
        match style {
            LinkHeaderStyle::Legacy => {
                let header: String = self
                    .iter()
                    .map(|(rel, url)| format!("<{url}>; rel={rel}"))
                    .collect();
                header.trim().trim_matches(',').to_owned()
            }
            LinkHeaderStyle::Rfc8288 => self
                .iter()
                .map(|(rel, url)| format!("<{url}>; rel=\"{rel}\""))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Build the navigation links and `Link` header for one page.
///
/// `params` carries whatever the endpoint's route needs (path placeholders)
/// plus any filters that should survive navigation (extra query pairs).
///
/// # Errors
/// Returns [`PaginationError`] when the endpoint is unknown or a path
/// parameter is missing.
pub fn build_pagination_links(
    registry: &EndpointRegistry,
    descriptor: &PageDescriptor,
    endpoint: &str,
    params: &[(&str, &str)],
    style: LinkHeaderStyle,
) -> Result<(NavLinks, String), PaginationError> {
    let links = NavLinks::build(registry, descriptor, endpoint, params)?;
    let header = links.link_header(style);
    Ok((links, header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> EndpointRegistry {
        EndpointRegistry::new().with_route("things", "/things")
    }

    fn descriptor(page: u32, total_pages: u32, has_prev: bool, has_next: bool) -> PageDescriptor {
        PageDescriptor {
            page,
            items_per_page: 10,
            total_pages,
            has_prev,
            has_next,
        }
    }

    #[rstest]
    fn middle_page_has_every_link(registry: EndpointRegistry) {
        let links = NavLinks::build(&registry, &descriptor(3, 5, true, true), "things", &[])
            .expect("build links");
        let rels: Vec<_> = links.iter().map(|(rel, _)| rel).collect();
        assert_eq!(rels, ["self", "first", "prev", "next", "last"]);
        assert_eq!(links.prev.as_deref(), Some("/things?page=2&per_page=10"));
        assert_eq!(links.next.as_deref(), Some("/things?page=4&per_page=10"));
        assert_eq!(links.last, "/things?page=5&per_page=10");
    }

    #[rstest]
    fn single_page_omits_neighbours(registry: EndpointRegistry) {
        let links = NavLinks::build(&registry, &descriptor(1, 1, false, false), "things", &[])
            .expect("build links");
        assert!(links.prev.is_none());
        assert!(links.next.is_none());
        assert_eq!(links.self_link, links.first);
        assert_eq!(links.first, links.last);
    }

    #[rstest]
    fn legacy_header_concatenates_without_separator(registry: EndpointRegistry) {
        let links = NavLinks::build(&registry, &descriptor(1, 2, false, true), "things", &[])
            .expect("build links");
        assert_eq!(
            links.link_header(LinkHeaderStyle::Legacy),
            "</things?page=1&per_page=10>; rel=self\
             </things?page=1&per_page=10>; rel=first\
             </things?page=2&per_page=10>; rel=next\
             </things?page=2&per_page=10>; rel=last"
        );
    }

    #[rstest]
    fn rfc_header_separates_entries(registry: EndpointRegistry) {
        let links = NavLinks::build(&registry, &descriptor(2, 2, true, false), "things", &[])
            .expect("build links");
        assert_eq!(
            links.link_header(LinkHeaderStyle::Rfc8288),
            "</things?page=2&per_page=10>; rel=\"self\", \
             </things?page=1&per_page=10>; rel=\"first\", \
             </things?page=1&per_page=10>; rel=\"prev\", \
             </things?page=2&per_page=10>; rel=\"last\""
        );
    }

    #[rstest]
    #[case("legacy", LinkHeaderStyle::Legacy)]
    #[case("RFC8288", LinkHeaderStyle::Rfc8288)]
    fn parses_header_styles(#[case] raw: &str, #[case] expected: LinkHeaderStyle) {
        assert_eq!(raw.parse::<LinkHeaderStyle>(), Ok(expected));
    }
}
