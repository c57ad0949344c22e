//! `bookmarks` command: list the books a user bookmarked.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pico_core::{Book, BookmarkStatus, CatalogStore, PageRequest, SqliteCatalogStore};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE,
    ARG_LINK_BASE_URL,
    ARG_LINK_HEADER,
    ARG_PAGE,
    ARG_PER_PAGE,
    ARG_STATUS,
    ARG_USER,
    CliError,
    ENV_BOOKMARKS_DATABASE,
    ENV_BOOKMARKS_USER,
    fs::require_existing,
    output::{LinkOptions, PaginatedResponse, write_json},
};

const ENDPOINT: &str = "bookmark_books";

/// CLI arguments for the `bookmarks` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "bookmarks",
    about = "Print the books a user bookmarked",
    long_about = "List the books a user bookmarked in book id order, \
                  optionally restricted to one reading status, and print the \
                  requested page with its navigation links."
)]
#[ortho_config(prefix = "PICO")]
pub(crate) struct BookmarksArgs {
    /// Path to the SQLite catalog database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Public identifier of the requesting user.
    #[arg(long = ARG_USER, value_name = "public_id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Only list bookmarks with this status.
    #[arg(long = ARG_STATUS, value_name = "status")]
    #[serde(default)]
    pub(crate) status: Option<String>,
    /// One-based page number (default 1).
    #[arg(long = ARG_PAGE, value_name = "n")]
    #[serde(default)]
    pub(crate) page: Option<u32>,
    /// Page size (default 10).
    #[arg(long = ARG_PER_PAGE, value_name = "n")]
    #[serde(default)]
    pub(crate) per_page: Option<u32>,
    /// Emit absolute links under this base URL.
    #[arg(long = ARG_LINK_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) link_base_url: Option<String>,
    /// `Link` header style: `legacy` or `rfc8288`.
    #[arg(long = ARG_LINK_HEADER, value_name = "style")]
    #[serde(default)]
    pub(crate) link_header: Option<String>,
}

impl BookmarksArgs {
    pub(crate) fn into_config(self) -> Result<BookmarksConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BookmarksConfig::try_from(merged)
    }
}

/// Resolved `bookmarks` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BookmarksConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) public_id: String,
    pub(crate) status: Option<BookmarkStatus>,
    pub(crate) request: PageRequest,
    pub(crate) links: LinkOptions,
}

impl TryFrom<BookmarksArgs> for BookmarksConfig {
    type Error = CliError;

    fn try_from(args: BookmarksArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_BOOKMARKS_DATABASE,
        })?;
        let public_id = args.user.ok_or(CliError::MissingArgument {
            field: ARG_USER,
            env: ENV_BOOKMARKS_USER,
        })?;
        let status = args
            .status
            .map(|raw| raw.parse::<BookmarkStatus>())
            .transpose()
            .map_err(|source| CliError::InvalidStatus {
                field: ARG_STATUS,
                source,
            })?;
        let defaults = PageRequest::default();
        let request = PageRequest::new(
            args.page.unwrap_or(defaults.page()),
            args.per_page.unwrap_or(defaults.per_page()),
        )?;
        Ok(Self {
            database,
            public_id,
            status,
            request,
            links: LinkOptions::parse(args.link_base_url, args.link_header)?,
        })
    }
}

pub(crate) fn run_bookmarks(args: BookmarksArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_bookmarks_with(args, &mut stdout)
}

pub(crate) fn run_bookmarks_with(
    args: BookmarksArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let response = execute_bookmarks(&config)?;
    write_json(writer, &response)
}

pub(crate) fn execute_bookmarks(
    config: &BookmarksConfig,
) -> Result<PaginatedResponse<Book>, CliError> {
    require_existing(&config.database, ARG_DATABASE)?;
    let store = SqliteCatalogStore::open_read_only(config.database.as_std_path())?;
    let user = store
        .user_by_public_id(&config.public_id)?
        .ok_or_else(|| CliError::UnknownUser {
            public_id: config.public_id.clone(),
        })?;
    let page = store.bookmarked_books(user.id, config.status, config.request)?;

    let descriptor = page.descriptor();
    let total_items = page.total_items;
    let params: Vec<(&str, &str)> = config
        .status
        .map(|status| ("status", status.as_str()))
        .into_iter()
        .collect();
    PaginatedResponse::build(
        page.items,
        descriptor,
        Some(total_items),
        ENDPOINT,
        &params,
        &config.links,
    )
}
