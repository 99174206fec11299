//! Export import orchestration.
//!
//! Walks an export document in dependency order (playlist, library info,
//! then per song: album, song, artists and links, thumbnails, file path,
//! playlist link) inside a single transaction.

mod error;
mod report;

pub use error::ImportError;
pub use report::{EntityFailure, ImportOutcome, ImportReport};

use crate::config::{ErrorPolicy, ImportConfig};
use crate::export::{load_export, ExportDocument, ExportSong};
use crate::library_store::upsert::{
    clear_thumbnails, demote_song_artists, insert_thumbnail, link_playlist_song,
    link_song_artist, upsert_album, upsert_artist, upsert_file_path, upsert_library_info,
    upsert_playlist, upsert_song, APP_VERSION_KEY, EXPORT_DATE_KEY,
};
use crate::library_store::{ImportTransaction, LibraryStore, SongRef, UpsertError};
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Options of a single import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    pub owner_user_id: i64,
    pub error_policy: ErrorPolicy,
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            owner_user_id: crate::config::DEFAULT_OWNER_USER_ID,
            error_policy: ErrorPolicy::default(),
            dry_run: false,
        }
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        ImportOptions {
            owner_user_id: config.owner_user_id,
            error_policy: config.error_policy,
            dry_run: config.dry_run,
        }
    }
}

/// Loads the configured export and imports it into the configured database.
///
/// The export is fully parsed before the database is opened. Once opened,
/// the connection is closed on every exit path.
pub fn run_import(config: &ImportConfig) -> Result<ImportReport, ImportError> {
    let document = load_export(&config.input_path)?;

    info!("Opening library database at {:?}...", config.database.path);
    let mut store = LibraryStore::open(&config.database.path).map_err(ImportError::Connection)?;

    let result = import_document(&mut store, &document, &ImportOptions::from(config));

    match store.close() {
        Ok(()) => info!("Database connection closed"),
        Err(e) => warn!("{:#}", e),
    }
    result
}

/// Imports `document` into `store` inside one transaction.
///
/// Returns the report of a committed (or, in dry-run mode, rolled back)
/// import. On error nothing written by this call is left in the database.
pub fn import_document(
    store: &mut LibraryStore,
    document: &ExportDocument,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError> {
    let tx = store.begin_import()?;
    let mut importer = Importer {
        tx,
        policy: options.error_policy,
        report: ImportReport {
            playlist_id: document.playlist_info.playlist_id.clone(),
            playlist_title: document.playlist_info.title.clone(),
            songs_total: document.songs.len(),
            ..Default::default()
        },
        seen_albums: HashSet::new(),
        seen_artists: HashSet::new(),
    };

    if let Err(err) = importer.walk(document, options.owner_user_id) {
        error!("{}", err);
        // Dropping the transaction would roll back as well
        match importer.tx.rollback() {
            Ok(()) => warn!("Changes rolled back"),
            Err(e) => error!("Rollback failed: {}", e),
        }
        return Err(err);
    }

    let Importer { tx, mut report, .. } = importer;
    if options.dry_run {
        tx.rollback()?;
        report.outcome = ImportOutcome::RolledBack;
        info!("Dry run complete, changes rolled back");
    } else {
        tx.commit()?;
        report.outcome = ImportOutcome::Committed;
        info!("All data imported successfully");
    }
    Ok(report)
}

struct Importer<'conn> {
    tx: ImportTransaction<'conn>,
    policy: ErrorPolicy,
    report: ImportReport,
    seen_albums: HashSet<i64>,
    seen_artists: HashSet<i64>,
}

impl Importer<'_> {
    /// Runs a step whose failure always aborts the import.
    fn critical<T, F>(&mut self, op: F) -> Result<T, ImportError>
    where
        F: FnOnce(&Connection) -> Result<T, UpsertError>,
    {
        Ok(self.tx.scoped(op)?)
    }

    /// Runs a step that, under [`ErrorPolicy::Continue`], may fail without
    /// aborting the import. A skipped step yields `None`.
    fn step<T, F>(&mut self, op: F) -> Result<Option<T>, ImportError>
    where
        F: FnOnce(&Connection) -> Result<T, UpsertError>,
    {
        match self.tx.scoped(op) {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.policy == ErrorPolicy::Continue && err.is_recoverable() => {
                warn!("{}", err);
                self.report.failures.push(EntityFailure::from(&err));
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn walk(&mut self, document: &ExportDocument, owner_user_id: i64) -> Result<(), ImportError> {
        let playlist = &document.playlist_info;
        self.critical(|conn| upsert_playlist(conn, playlist, owner_user_id))?;
        info!("Upserted playlist: {}", playlist.title);

        self.critical(|conn| {
            upsert_library_info(conn, EXPORT_DATE_KEY, &document.export_date)?;
            upsert_library_info(conn, APP_VERSION_KEY, &document.app_version)
        })?;
        info!("Upserted library information");

        let total = document.songs.len();
        info!("Processing {} songs...", total);
        for (index, song) in document.songs.iter().enumerate() {
            let track_order = index as i64 + 1;
            info!("[{}/{}] Processing: {}", track_order, total, song.title);
            self.import_song(&playlist.playlist_id, song, track_order)?;
        }
        Ok(())
    }

    fn import_song(
        &mut self,
        playlist_id: &str,
        song: &ExportSong,
        track_order: i64,
    ) -> Result<(), ImportError> {
        let album_id = match &song.album {
            Some(album) => {
                let album_id = self.step(|conn| upsert_album(conn, album))?;
                if let Some(id) = album_id {
                    if self.seen_albums.insert(id) {
                        self.report.albums += 1;
                    }
                }
                album_id
            }
            None => None,
        };

        let Some(song_id) = self.step(|conn| upsert_song(conn, song, album_id))? else {
            warn!("Skipping dependent rows of song: {}", song.title);
            self.report.songs_skipped += 1;
            return Ok(());
        };
        let song_ref = SongRef {
            id: song_id,
            title: &song.title,
        };

        self.step(|conn| demote_song_artists(conn, song_ref))?;
        let mut linked = HashSet::new();
        for (position, artist) in song.artists().iter().enumerate() {
            let Some(artist_id) = self.step(|conn| upsert_artist(conn, artist))? else {
                continue;
            };
            if self.seen_artists.insert(artist_id) {
                self.report.artists += 1;
            }
            // First listing of an artist decides its flag
            if !linked.insert(artist_id) {
                continue;
            }

            let is_primary = position == 0;
            if self
                .step(|conn| link_song_artist(conn, song_ref, artist_id, &artist.name, is_primary))?
                .is_some()
            {
                self.report.artist_links += 1;
            }
        }

        if self.step(|conn| clear_thumbnails(conn, song_ref))?.is_some() {
            for thumbnail in song.thumbnails() {
                if self
                    .step(|conn| insert_thumbnail(conn, song_ref, &thumbnail.url))?
                    .is_some()
                {
                    self.report.thumbnails += 1;
                }
            }
        } else {
            warn!("Keeping previous thumbnails of song: {}", song.title);
        }

        if let Some(file_url) = song.file_url() {
            if self
                .step(|conn| upsert_file_path(conn, song_ref, file_url))?
                .is_some()
            {
                self.report.file_paths += 1;
            }
        }

        if self
            .step(|conn| link_playlist_song(conn, playlist_id, song_ref, track_order))?
            .is_some()
        {
            self.report.playlist_links += 1;
        }

        self.report.songs_imported += 1;
        info!("  Processed song: {}", song.title);
        Ok(())
    }
}
