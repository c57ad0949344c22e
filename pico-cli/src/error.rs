//! Error types emitted by the Pico CLI.
//!
//! Every command returns `Result<_, CliError>`; `main` prints the rendered
//! error and exits with status 1.

use std::sync::Arc;

use camino::Utf8PathBuf;
use pico_core::{PageRequestError, PaginationError, ParseBookmarkStatusError, SqliteCatalogError};
use pico_scorer::{PopularityError, RecommendError};
use thiserror::Error;

/// Errors emitted by the Pico CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option carried a value outside its accepted set.
    #[error("invalid {field} value {value:?}: {reason}")]
    InvalidOption {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Creating the directory that will hold the database failed.
    #[error("failed to create parent directory for {path:?}: {source}")]
    CreateParentDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or querying the SQLite catalog failed.
    #[error(transparent)]
    Catalog(#[from] SqliteCatalogError),
    /// `page` or `per_page` was zero.
    #[error("invalid page request: {0}")]
    InvalidPage(#[from] PageRequestError),
    /// The bookmark status filter did not name a known status.
    #[error("invalid {field}: {source}")]
    InvalidStatus {
        field: &'static str,
        #[source]
        source: ParseBookmarkStatusError,
    },
    /// No user carries the requested public identifier.
    #[error("no user with public id {public_id:?}")]
    UnknownUser { public_id: String },
    /// The popularity precomputation job failed.
    #[error("popularity precomputation failed: {0}")]
    Popularity(#[from] PopularityError<SqliteCatalogError>),
    /// Ranking recommendations failed.
    #[error("recommendation failed: {0}")]
    Recommend(#[from] RecommendError<SqliteCatalogError>),
    /// Building navigation links failed.
    #[error("failed to build pagination links: {0}")]
    Pagination(#[from] PaginationError),
    /// Serializing the command output failed.
    #[error("failed to serialize output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
