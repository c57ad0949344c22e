//! Command-line interface for the Pico Library scoring core.
//!
//! The `pico` binary prepares a SQLite catalog, runs the popularity
//! precomputation job and renders recommendation and bookmark listings as
//! paginated JSON documents.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod book_bookmarks;
mod bookmarks;
mod error;
mod fs;
mod init;
mod output;
mod popularity;
mod recommend;

pub use error::CliError;

use book_bookmarks::{BookBookmarksArgs, run_book_bookmarks};
use bookmarks::{BookmarksArgs, run_bookmarks};
use init::{InitArgs, run_init};
use popularity::{PopularityArgs, run_popularity};
use recommend::{RecommendArgs, run_recommend};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_BOOK: &str = "book";
pub(crate) const ARG_PAGE: &str = "page";
pub(crate) const ARG_PER_PAGE: &str = "per-page";
pub(crate) const ARG_LANGUAGE: &str = "language";
pub(crate) const ARG_STATUS: &str = "status";
pub(crate) const ARG_CANDIDATE_WINDOW: &str = "candidate-window";
pub(crate) const ARG_TOTAL_PAGES: &str = "total-pages";
pub(crate) const ARG_LINK_BASE_URL: &str = "link-base-url";
pub(crate) const ARG_LINK_HEADER: &str = "link-header";

pub(crate) const ENV_INIT_DATABASE: &str = "PICO_CMDS_INIT_DATABASE";
pub(crate) const ENV_POPULARITY_DATABASE: &str = "PICO_CMDS_POPULARITY_DATABASE";
pub(crate) const ENV_RECOMMEND_DATABASE: &str = "PICO_CMDS_RECOMMEND_DATABASE";
pub(crate) const ENV_RECOMMEND_USER: &str = "PICO_CMDS_RECOMMEND_USER";
pub(crate) const ENV_BOOKMARKS_DATABASE: &str = "PICO_CMDS_BOOKMARKS_DATABASE";
pub(crate) const ENV_BOOKMARKS_USER: &str = "PICO_CMDS_BOOKMARKS_USER";
pub(crate) const ENV_BOOK_BOOKMARKS_DATABASE: &str = "PICO_CMDS_BOOK_BOOKMARKS_DATABASE";
pub(crate) const ENV_BOOK_BOOKMARKS_BOOK: &str = "PICO_CMDS_BOOK_BOOKMARKS_BOOK";

/// Run the Pico CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration layering or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Init(args) => run_init(args),
        Command::Popularity(args) => run_popularity(args),
        Command::Recommend(args) => run_recommend(args),
        Command::Bookmarks(args) => run_bookmarks(args),
        Command::BookBookmarks(args) => run_book_bookmarks(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pico",
    about = "Catalog scoring and recommendation utilities for Pico Library",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the catalog schema in a SQLite database.
    Init(InitArgs),
    /// Recompute every book's cached popularity score.
    Popularity(PopularityArgs),
    /// Print one page of recommendations for a user.
    Recommend(RecommendArgs),
    /// Print one page of the books a user bookmarked.
    Bookmarks(BookmarksArgs),
    /// Print one page of the bookmarks left on a book.
    BookBookmarks(BookBookmarksArgs),
}

#[cfg(test)]
mod tests;
