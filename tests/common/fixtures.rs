//! Export files and library databases in temporary directories

use super::constants::*;
use playlist_import::config::{DatabaseSettings, ErrorPolicy, ImportConfig};
use playlist_import::import::{run_import, ImportError, ImportReport};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A three-song export: two songs sharing an album, one bare song.
pub fn road_trip_export() -> Value {
    json!({
        "exportDate": EXPORT_DATE,
        "appVersion": APP_VERSION,
        "playlistInfo": {
            "playlistId": PLAYLIST_ID,
            "title": PLAYLIST_TITLE,
            "description": "Songs for the long drive"
        },
        "songs": [
            {
                "title": "Highway Song",
                "duration": 215.4,
                "videoId": SONG_1_VIDEO_ID,
                "album": { "name": "Open Roads", "id": ALBUM_SOURCE_ID },
                "artists": [
                    { "name": "The Test Band", "id": ARTIST_1_SOURCE_ID },
                    { "name": "Jazz Ensemble", "id": ARTIST_2_SOURCE_ID }
                ],
                "thumbnails": [
                    { "url": "https://img.example/highway-60.jpg" },
                    { "url": "https://img.example/highway-120.jpg" }
                ],
                "url": "file:///music/highway.m4a"
            },
            {
                "title": "Desert Night",
                "duration": 187,
                "videoId": SONG_2_VIDEO_ID,
                "album": { "name": "Open Roads", "id": ALBUM_SOURCE_ID },
                "artists": [ { "name": "The Test Band", "id": ARTIST_1_SOURCE_ID } ],
                "thumbnails": [ { "url": "https://img.example/desert-60.jpg" } ]
            },
            {
                "title": "Rest Stop",
                "videoId": SONG_3_VIDEO_ID
            }
        ]
    })
}

/// A temporary directory holding an export file and a library database path.
pub struct TestLibrary {
    _dir: TempDir,
    pub export_path: PathBuf,
    pub db_path: PathBuf,
    pub error_policy: ErrorPolicy,
    pub dry_run: bool,
}

impl TestLibrary {
    pub fn with_export(export: &Value) -> Self {
        Self::with_raw_export(&export.to_string())
    }

    pub fn with_raw_export(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let export_path = dir.path().join("export.json");
        fs::write(&export_path, content).unwrap();
        let db_path = dir.path().join("library.db");
        TestLibrary {
            _dir: dir,
            export_path,
            db_path,
            error_policy: ErrorPolicy::Continue,
            dry_run: false,
        }
    }

    /// Replaces the export file, keeping the database.
    pub fn rewrite_export(&self, export: &Value) {
        fs::write(&self.export_path, export.to_string()).unwrap();
    }

    pub fn config(&self) -> ImportConfig {
        ImportConfig {
            input_path: self.export_path.clone(),
            database: DatabaseSettings {
                path: self.db_path.clone(),
            },
            owner_user_id: 1,
            error_policy: self.error_policy,
            dry_run: self.dry_run,
        }
    }

    pub fn run(&self) -> Result<ImportReport, ImportError> {
        run_import(&self.config())
    }

    pub fn connection(&self) -> Connection {
        Connection::open(&self.db_path).unwrap()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                r.get(0)
            })
            .unwrap()
    }
}
