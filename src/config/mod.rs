mod file_config;

pub use file_config::{DatabaseConfig, FileConfig};

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// What to do when writing one entity of the export fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorPolicy {
    /// Skip the failed entity (and, for a song, its dependent rows) and keep
    /// importing. Failures are listed in the import report.
    #[default]
    Continue,
    /// Roll back the whole import on the first failure.
    Abort,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub input_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub owner_user_id: Option<i64>,
    pub on_error: Option<ErrorPolicy>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub input_path: PathBuf,
    pub database: DatabaseSettings,
    /// Owner recorded on newly created playlists.
    pub owner_user_id: i64,
    pub error_policy: ErrorPolicy,
    /// Walk the whole export, then roll back instead of committing.
    pub dry_run: bool,
}

pub const DEFAULT_OWNER_USER_ID: i64 = 1;

impl ImportConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let input_path = file
            .input_path
            .map(PathBuf::from)
            .or_else(|| cli.input_path.clone())
            .ok_or_else(|| {
                anyhow!("input path must be specified as an argument or in config file")
            })?;

        let db_path = file
            .database
            .and_then(|db| db.path)
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("database path must be specified via --db or in config file"))?;

        if db_path.is_dir() {
            bail!("Database path is a directory: {:?}", db_path);
        }

        let owner_user_id = file
            .owner_user_id
            .or(cli.owner_user_id)
            .unwrap_or(DEFAULT_OWNER_USER_ID);

        let error_policy = match file.on_error {
            Some(s) => parse_error_policy(&s)
                .ok_or_else(|| anyhow!("Invalid on_error value in config file: {}", s))?,
            None => cli.on_error.unwrap_or_default(),
        };

        let dry_run = file.dry_run.unwrap_or(cli.dry_run);

        Ok(Self {
            input_path,
            database: DatabaseSettings { path: db_path },
            owner_user_id,
            error_policy,
            dry_run,
        })
    }
}

/// Parses an error policy string. Uses clap's ValueEnum trait for parsing.
fn parse_error_policy(s: &str) -> Option<ErrorPolicy> {
    ErrorPolicy::from_str(s, true).ok()
}
