//! JSON rendering shared by the commands.

use std::io::Write;

use pico_core::{
    EndpointRegistry, LinkHeaderStyle, NavLinks, PageDescriptor, build_pagination_links,
};
use serde::Serialize;

use crate::{ARG_LINK_HEADER, CliError};

/// Resolved link-building options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct LinkOptions {
    /// Absolute base for the emitted links; relative links when `None`.
    pub(crate) base_url: Option<String>,
    /// How the `Link` header joins its entries.
    pub(crate) header_style: LinkHeaderStyle,
}

impl LinkOptions {
    pub(crate) fn parse(
        base_url: Option<String>,
        header_style: Option<String>,
    ) -> Result<Self, CliError> {
        let header_style = match header_style {
            Some(raw) => raw
                .parse::<LinkHeaderStyle>()
                .map_err(|reason| CliError::InvalidOption {
                    field: ARG_LINK_HEADER,
                    value: raw,
                    reason,
                })?,
            None => LinkHeaderStyle::default(),
        };
        Ok(Self {
            base_url,
            header_style,
        })
    }

    fn registry(&self) -> Result<EndpointRegistry, CliError> {
        let registry = EndpointRegistry::library_defaults();
        match &self.base_url {
            Some(base) => Ok(registry.with_base_url(base)?),
            None => Ok(registry),
        }
    }
}

/// A page of items with its pagination flags, navigation links and the
/// rendered `Link` header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) page: u32,
    pub(crate) items_per_page: u32,
    pub(crate) total_pages: u32,
    pub(crate) has_prev: bool,
    pub(crate) has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) total_items: Option<u64>,
    pub(crate) links: NavLinks,
    pub(crate) link_header: String,
}

impl<T> PaginatedResponse<T> {
    pub(crate) fn build(
        items: Vec<T>,
        descriptor: PageDescriptor,
        total_items: Option<u64>,
        endpoint: &str,
        params: &[(&str, &str)],
        options: &LinkOptions,
    ) -> Result<Self, CliError> {
        let registry = options.registry()?;
        let (links, link_header) = build_pagination_links(
            &registry,
            &descriptor,
            endpoint,
            params,
            options.header_style,
        )?;
        Ok(Self {
            items,
            page: descriptor.page,
            items_per_page: descriptor.items_per_page,
            total_pages: descriptor.total_pages,
            has_prev: descriptor.has_prev,
            has_next: descriptor.has_next,
            total_items,
            links,
            link_header,
        })
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
