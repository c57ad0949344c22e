//! `book-bookmarks` command: list every reader's bookmark on one book.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pico_core::{Bookmark, CatalogStore, PageRequest, SqliteCatalogStore};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BOOK,
    ARG_DATABASE,
    ARG_LINK_BASE_URL,
    ARG_LINK_HEADER,
    ARG_PAGE,
    ARG_PER_PAGE,
    CliError,
    ENV_BOOK_BOOKMARKS_BOOK,
    ENV_BOOK_BOOKMARKS_DATABASE,
    fs::require_existing,
    output::{LinkOptions, PaginatedResponse, write_json},
};

const ENDPOINT: &str = "bookmarks";

/// CLI arguments for the `book-bookmarks` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "book-bookmarks",
    about = "Print the bookmarks left on a book",
    long_about = "List the bookmarks every user left on one book in bookmark \
                  id order and print the requested page with its navigation \
                  links."
)]
#[ortho_config(prefix = "PICO")]
pub(crate) struct BookBookmarksArgs {
    /// Path to the SQLite catalog database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Identifier of the book.
    #[arg(long = ARG_BOOK, value_name = "id")]
    #[serde(default)]
    pub(crate) book: Option<u64>,
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

impl BookBookmarksArgs {
    pub(crate) fn into_config(self) -> Result<BookBookmarksConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BookBookmarksConfig::try_from(merged)
    }
}

/// Resolved `book-bookmarks` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BookBookmarksConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) book_id: u64,
    pub(crate) request: PageRequest,
    pub(crate) links: LinkOptions,
}

impl TryFrom<BookBookmarksArgs> for BookBookmarksConfig {
    type Error = CliError;

    fn try_from(args: BookBookmarksArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_BOOK_BOOKMARKS_DATABASE,
        })?;
        let book_id = args.book.ok_or(CliError::MissingArgument {
            field: ARG_BOOK,
            env: ENV_BOOK_BOOKMARKS_BOOK,
        })?;
        let defaults = PageRequest::default();
        let request = PageRequest::new(
            args.page.unwrap_or(defaults.page()),
            args.per_page.unwrap_or(defaults.per_page()),
        )?;
        Ok(Self {
            database,
            book_id,
            request,
            links: LinkOptions::parse(args.link_base_url, args.link_header)?,
        })
    }
}

pub(crate) fn run_book_bookmarks(args: BookBookmarksArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_book_bookmarks_with(args, &mut stdout)
}

pub(crate) fn run_book_bookmarks_with(
    args: BookBookmarksArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let response = execute_book_bookmarks(&config)?;
    write_json(writer, &response)
}

pub(crate) fn execute_book_bookmarks(
    config: &BookBookmarksConfig,
) -> Result<PaginatedResponse<Bookmark>, CliError> {
    require_existing(&config.database, ARG_DATABASE)?;
    let store = SqliteCatalogStore::open_read_only(config.database.as_std_path())?;
    let page = store.bookmarks_for_book(config.book_id, config.request)?;

    let descriptor = page.descriptor();
    let total_items = page.total_items;
    let book_id = config.book_id.to_string();
    PaginatedResponse::build(
        page.items,
        descriptor,
        Some(total_items),
        ENDPOINT,
        &[("book_id", book_id.as_str())],
        &config.links,
    )
}
