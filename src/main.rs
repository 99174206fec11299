//! Playlist Import Tool
//!
//! Imports a JSON playlist export into the SQLite music library.

use anyhow::{Context, Result};
use clap::Parser;
use playlist_import::config::{CliConfig, ErrorPolicy, FileConfig, ImportConfig};
use playlist_import::import::{run_import, ImportOutcome, ImportReport};
use playlist_import::library_store::LibraryStore;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().context("Could not resolve current directory")?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(name = "playlist-import")]
#[command(about = "Import a JSON playlist export into the music library database")]
#[command(styles = cli_style::get_styles())]
struct CliArgs {
    /// Path to the JSON export file.
    #[clap(value_parser = parse_path)]
    pub input: Option<PathBuf>,

    /// Path to the SQLite library database file. Created if missing.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// User recorded as owner of newly created playlists.
    #[clap(long)]
    pub owner_user_id: Option<i64>,

    /// What to do when a single entity cannot be written.
    #[clap(long, value_enum)]
    pub on_error: Option<ErrorPolicy>,

    /// Run the whole import, then roll it back.
    #[clap(long, default_value_t = false)]
    pub dry_run: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            input_path: self.input.clone(),
            db_path: self.db.clone(),
            owner_user_id: self.owner_user_id,
            on_error: self.on_error,
            dry_run: self.dry_run,
        }
    }
}

fn log_report(report: &ImportReport) {
    info!("Import Summary");
    info!("==============");
    info!(
        "Playlist: {} ({})",
        report.playlist_title, report.playlist_id
    );
    info!(
        "Songs: {} imported, {} skipped, {} total",
        report.songs_imported, report.songs_skipped, report.songs_total
    );
    info!("Albums written: {}", report.albums);
    info!("Artists written: {}", report.artists);
    info!("Artist links written: {}", report.artist_links);
    info!("Thumbnails written: {}", report.thumbnails);
    info!("File paths written: {}", report.file_paths);
    info!("Playlist links written: {}", report.playlist_links);

    if !report.is_clean() {
        warn!("{} entities could not be written:", report.failures.len());
        for failure in &report.failures {
            warn!("  - {}", failure);
        }
    }
}

fn log_library_counts(config: &ImportConfig) -> Result<()> {
    let store = LibraryStore::open(&config.database.path)?;
    let counts = store.counts()?;
    info!("Database contains:");
    for (table, count) in &counts.tables {
        info!("  {}: {}", table, count);
    }
    store.close()
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    info!("Playlist Import Tool");
    info!("====================");
    info!(
        "Version {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = ImportConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Input file: {}", config.input_path.display());
    info!("Library database: {}", config.database.path.display());
    info!("Error policy: {:?}", config.error_policy);
    if config.dry_run {
        info!("Dry run: changes will be rolled back");
    }

    let report = run_import(&config)?;
    log_report(&report);

    match report.outcome {
        ImportOutcome::Committed => {
            info!("Import completed successfully!");
            log_library_counts(&config)?;
        }
        ImportOutcome::RolledBack => info!("Dry run finished, nothing was written"),
    }

    Ok(())
}
