//! `init` command: create the catalog schema.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pico_core::SqliteCatalogStore;
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, CliError, ENV_INIT_DATABASE, fs::ensure_parent_dir, output::write_json};

/// CLI arguments for the `init` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "init",
    about = "Create the catalog schema",
    long_about = "Create every catalog table and index that does not exist \
                  yet. The database file and its parent directories are \
                  created when missing; existing data is left untouched."
)]
#[ortho_config(prefix = "PICO")]
pub(crate) struct InitArgs {
    /// Path to the SQLite catalog database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl InitArgs {
    pub(crate) fn into_config(self) -> Result<InitConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InitConfig::try_from(merged)
    }
}

/// Resolved `init` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InitConfig {
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<InitArgs> for InitConfig {
    type Error = CliError;

    fn try_from(args: InitArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_INIT_DATABASE,
        })?;
        Ok(Self { database })
    }
}

#[derive(Debug, Serialize)]
struct InitReport {
    database: Utf8PathBuf,
    schema_ready: bool,
}

pub(crate) fn run_init(args: InitArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_init_with(args, &mut stdout)
}

pub(crate) fn run_init_with(args: InitArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    initialise(&config)?;
    write_json(
        writer,
        &InitReport {
            database: config.database,
            schema_ready: true,
        },
    )
}

pub(crate) fn initialise(config: &InitConfig) -> Result<SqliteCatalogStore, CliError> {
    ensure_parent_dir(&config.database).map_err(|source| CliError::CreateParentDir {
        path: config.database.clone(),
        source,
    })?;
    let store = SqliteCatalogStore::open(config.database.as_std_path())?;
    store.initialise_schema()?;
    info!("catalog schema ready in {}", config.database);
    Ok(store)
}
