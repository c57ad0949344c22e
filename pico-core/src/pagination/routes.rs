//! Route templates that let the link builder reconstruct endpoint URLs.

use std::collections::BTreeMap;

use url::{Position, Url};

use super::PaginationError;

/// Base used to resolve relative links; only the path and query are emitted.
const RELATIVE_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Parameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteTemplate {
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parse `/api/v1/bookmarks/<book_id>` style templates. Placeholders may
    /// carry a converter prefix (`<int:agent_id>`), which is ignored.
    fn parse(template: &str) -> Self {
        let trimmed = template.strip_prefix('/').unwrap_or(template);
        let segments = trimmed
            .split('/')
            .map(|segment| {
                segment
                    .strip_prefix('<')
                    .and_then(|rest| rest.strip_suffix('>'))
                    .map_or_else(
                        || Segment::Literal(segment.to_owned()),
                        |inner| {
                            let name = inner.rsplit(':').next().unwrap_or(inner);
                            Segment::Parameter(name.to_owned())
                        },
                    )
            })
            .collect();
        Self { segments }
    }

    fn takes_parameter(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Parameter(param) if param == name))
    }
}

/// Registry of named endpoints and the templates used to build their URLs.
///
/// Links are emitted as absolute paths (`/api/v1/...`) unless a public base
/// URL is configured, in which case they are absolute URLs under that base.
///
/// # Examples
/// ```
/// use pico_core::EndpointRegistry;
///
/// let registry =
///     EndpointRegistry::new().with_route("agent_books", "/agents/<int:agent_id>/books");
/// let url = registry.url_for("agent_books", &[("agent_id", "7"), ("q", "twain")], 2, 5)?;
/// assert_eq!(url, "/agents/7/books?q=twain&page=2&per_page=5");
/// # Ok::<(), pico_core::PaginationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    routes: BTreeMap<String, RouteTemplate>,
    base_url: Option<Url>,
}

impl EndpointRegistry {
    /// Create an empty registry that emits relative links.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every paginated collection endpoint of the library
    /// API.
    #[must_use]
    pub fn library_defaults() -> Self {
        Self::new()
            .with_route("bookmarks", "/api/v1/bookmarks/<book_id>")
            .with_route("bookmark_books", "/api/v1/bookmarks/books")
            .with_route("agents", "/api/v1/agents/")
            .with_route("popular_agents", "/api/v1/agents/popular")
            .with_route("recommendations", "/api/v1/books/recommendations")
    }

    /// Register or replace a route template.
    pub fn insert(&mut self, endpoint: impl Into<String>, template: &str) {
        self.routes
            .insert(endpoint.into(), RouteTemplate::parse(template));
    }

    /// Register a route while consuming `self`, enabling chaining.
    #[must_use]
    pub fn with_route(mut self, endpoint: impl Into<String>, template: &str) -> Self {
        self.insert(endpoint, template);
        self
    }

    /// Emit absolute URLs under `base` instead of relative paths.
    ///
    /// # Errors
    /// Returns [`PaginationError::InvalidBaseUrl`] when `base` does not parse
    /// and [`PaginationError::CannotBeABase`] when it cannot carry a path.
    pub fn with_base_url(mut self, base: &str) -> Result<Self, PaginationError> {
        let parsed = Url::parse(base).map_err(|source| PaginationError::InvalidBaseUrl {
            base: base.to_owned(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(PaginationError::CannotBeABase {
                base: base.to_owned(),
            });
        }
        self.base_url = Some(parsed);
        Ok(self)
    }

    /// Build the URL of one page of `endpoint`.
    ///
    /// Parameters matching a placeholder fill the path; the rest become
    /// query parameters, in the order given, ahead of `page` and `per_page`.
    ///
    /// # Errors
    /// Returns [`PaginationError::UnknownEndpoint`] for unregistered
    /// endpoints and [`PaginationError::MissingPathParameter`] when a
    /// placeholder has no value.
    pub fn url_for(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        page: u32,
        per_page: u32,
    ) -> Result<String, PaginationError> {
        let route = self
            .routes
            .get(endpoint)
            .ok_or_else(|| PaginationError::UnknownEndpoint {
                endpoint: endpoint.to_owned(),
            })?;

        let mut url = self.base()?;
        {
            let base_text = url.as_str().to_owned();
            let mut path = url
                .path_segments_mut()
                .map_err(|()| PaginationError::CannotBeABase { base: base_text })?;
            path.pop_if_empty();
            for segment in &route.segments {
                match segment {
                    Segment::Literal(text) => {
                        path.push(text);
                    }
                    Segment::Parameter(name) => {
                        let value = lookup(params, name).ok_or_else(|| {
                            PaginationError::MissingPathParameter {
                                endpoint: endpoint.to_owned(),
                                parameter: name.clone(),
                            }
                        })?;
                        path.push(value);
                    }
                }
            }
        }

        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in params {
                if !route.takes_parameter(name) {
                    query.append_pair(name, value);
                }
            }
            query
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &per_page.to_string());
        }

        if self.base_url.is_some() {
            Ok(url.into())
        } else {
            Ok(url[Position::BeforePath..].to_owned())
        }
    }

    fn base(&self) -> Result<Url, PaginationError> {
        match &self.base_url {
            Some(base) => Ok(base.clone()),
            None => Url::parse(RELATIVE_BASE).map_err(|source| PaginationError::InvalidBaseUrl {
                base: RELATIVE_BASE.to_owned(),
                source,
            }),
        }
    }
}

fn lookup<'a>(params: &[(&str, &'a str)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}
