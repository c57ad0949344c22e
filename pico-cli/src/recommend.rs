//! `recommend` command: rank and paginate books for one user.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pico_core::{PageRequest, SqliteCatalogStore};
use pico_scorer::{RecommendConfig, ScoredBook, TotalPagesPolicy, recommend_for_public_id};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CANDIDATE_WINDOW,
    ARG_DATABASE,
    ARG_LANGUAGE,
    ARG_LINK_BASE_URL,
    ARG_LINK_HEADER,
    ARG_PAGE,
    ARG_PER_PAGE,
    ARG_TOTAL_PAGES,
    ARG_USER,
    CliError,
    ENV_RECOMMEND_DATABASE,
    ENV_RECOMMEND_USER,
    fs::require_existing,
    output::{LinkOptions, PaginatedResponse, write_json},
};

const ENDPOINT: &str = "recommendations";

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recommend",
    about = "Print recommendations for a user",
    long_about = "Rank the most popular books the user has not bookmarked \
                  by their affinity to the user's followed subjects and \
                  bookshelves, then print the requested page with its \
                  navigation links."
)]
#[ortho_config(prefix = "PICO")]
pub(crate) struct RecommendArgs {
    /// Path to the SQLite catalog database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Public identifier of the requesting user.
    #[arg(long = ARG_USER, value_name = "public_id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// One-based page number (default 1).
    #[arg(long = ARG_PAGE, value_name = "n")]
    #[serde(default)]
    pub(crate) page: Option<u32>,
    /// Page size (default 10).
    #[arg(long = ARG_PER_PAGE, value_name = "n")]
    #[serde(default)]
    pub(crate) per_page: Option<u32>,
    /// Only recommend books in this language code.
    #[arg(long = ARG_LANGUAGE, value_name = "code")]
    #[serde(default)]
    pub(crate) language: Option<String>,
    /// Number of popular candidates re-ranked (default 200).
    #[arg(long = ARG_CANDIDATE_WINDOW, value_name = "n")]
    #[serde(default)]
    pub(crate) candidate_window: Option<usize>,
    /// Page count policy: `legacy` or `ceiling`.
    #[arg(long = ARG_TOTAL_PAGES, value_name = "policy")]
    #[serde(default)]
    pub(crate) total_pages: Option<String>,
    /// Emit absolute links under this base URL.
    #[arg(long = ARG_LINK_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) link_base_url: Option<String>,
    /// `Link` header style: `legacy` or `rfc8288`.
    #[arg(long = ARG_LINK_HEADER, value_name = "style")]
    #[serde(default)]
    pub(crate) link_header: Option<String>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendCommandConfig::try_from(merged)
    }
}

/// Resolved `recommend` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecommendCommandConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) public_id: String,
    pub(crate) request: PageRequest,
    pub(crate) language: Option<String>,
    pub(crate) ranking: RecommendConfig,
    pub(crate) links: LinkOptions,
}

impl TryFrom<RecommendArgs> for RecommendCommandConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_RECOMMEND_DATABASE,
        })?;
        let public_id = args.user.ok_or(CliError::MissingArgument {
            field: ARG_USER,
            env: ENV_RECOMMEND_USER,
        })?;
        let defaults = PageRequest::default();
        let request = PageRequest::new(
            args.page.unwrap_or(defaults.page()),
            args.per_page.unwrap_or(defaults.per_page()),
        )?;

        let mut ranking = RecommendConfig::default();
        if let Some(window) = args.candidate_window {
            ranking.candidate_window = window;
        }
        if let Some(raw) = args.total_pages {
            ranking.total_pages = raw
                .parse::<TotalPagesPolicy>()
                .map_err(|reason| CliError::InvalidOption {
                    field: ARG_TOTAL_PAGES,
                    value: raw,
                    reason,
                })?;
        }

        Ok(Self {
            database,
            public_id,
            request,
            language: args.language,
            ranking,
            links: LinkOptions::parse(args.link_base_url, args.link_header)?,
        })
    }
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_recommend_with(args, &mut stdout)
}

pub(crate) fn run_recommend_with(
    args: RecommendArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let response = execute_recommend(&config)?;
    write_json(writer, &response)
}

pub(crate) fn execute_recommend(
    config: &RecommendCommandConfig,
) -> Result<PaginatedResponse<ScoredBook>, CliError> {
    require_existing(&config.database, ARG_DATABASE)?;
    let store = SqliteCatalogStore::open_read_only(config.database.as_std_path())?;
    let recommendations = recommend_for_public_id(
        &store,
        &config.public_id,
        config.request,
        config.language.as_deref(),
        &config.ranking,
    )?;

    let descriptor = recommendations.descriptor();
    let params: Vec<(&str, &str)> = config
        .language
        .as_deref()
        .map(|language| ("language", language))
        .into_iter()
        .collect();
    PaginatedResponse::build(
        recommendations.books,
        descriptor,
        None,
        ENDPOINT,
        &params,
        &config.links,
    )
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecommendCommandConfig, CliError> {
    let merged = RecommendArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecommendCommandConfig::try_from(merged)
}
