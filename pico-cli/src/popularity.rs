//! `popularity` command: run the precomputation job against a catalog.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pico_core::SqliteCatalogStore;
use pico_scorer::run_popularity_precomputation;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, CliError, ENV_POPULARITY_DATABASE, fs::require_existing, output::write_json,
};

/// CLI arguments for the `popularity` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "popularity",
    about = "Recompute cached popularity scores",
    long_about = "Score every book from its tags, reviews, bookmarks and \
                  downloads, then overwrite its cached popularity score. \
                  Run one instance at a time; the job takes no lock."
)]
#[ortho_config(prefix = "PICO")]
pub(crate) struct PopularityArgs {
    /// Path to the SQLite catalog database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl PopularityArgs {
    pub(crate) fn into_config(self) -> Result<PopularityConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PopularityConfig::try_from(merged)
    }
}

/// Resolved `popularity` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PopularityConfig {
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<PopularityArgs> for PopularityConfig {
    type Error = CliError;

    fn try_from(args: PopularityArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_POPULARITY_DATABASE,
        })?;
        Ok(Self { database })
    }
}

pub(crate) fn run_popularity(args: PopularityArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_popularity_with(args, &mut stdout)
}

pub(crate) fn run_popularity_with(
    args: PopularityArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.database, ARG_DATABASE)?;
    let mut store = SqliteCatalogStore::open(config.database.as_std_path())?;
    let report = run_popularity_precomputation(&mut store)?;
    write_json(writer, &report)
}
