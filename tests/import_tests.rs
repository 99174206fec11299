//! End-to-end tests of `run_import` against database files on disk.

mod common;

use common::*;
use playlist_import::config::ErrorPolicy;
use playlist_import::export::LoadError;
use playlist_import::import::{ImportError, ImportOutcome};
use playlist_import::library_store::{EntityKind, LibraryStore};

fn table_counts(library: &TestLibrary) -> Vec<(&'static str, usize)> {
    let store = LibraryStore::open(&library.db_path).unwrap();
    let counts = store.counts().unwrap();
    store.close().unwrap();
    counts.tables
}

#[test]
fn test_import_creates_library() {
    let library = TestLibrary::with_export(&road_trip_export());

    let report = library.run().unwrap();

    assert_eq!(report.outcome, ImportOutcome::Committed);
    assert!(report.is_clean());
    assert_eq!(report.playlist_id, PLAYLIST_ID);
    assert_eq!(report.songs_imported, 3);

    assert_eq!(library.count("Playlists"), 1);
    assert_eq!(library.count("Library_Info"), 2);
    assert_eq!(library.count("Artists"), 2);
    assert_eq!(library.count("Albums"), 1);
    assert_eq!(library.count("Songs"), 3);
    assert_eq!(library.count("Song_Artists"), 3);
    assert_eq!(library.count("Thumbnails"), 3);
    assert_eq!(library.count("FilePaths"), 1);
    assert_eq!(library.count("Playlist_Songs"), 3);

    let conn = library.connection();
    let (title, owner, description): (String, i64, Option<String>) = conn
        .query_row(
            "SELECT Title, UserID, Description FROM Playlists WHERE PlaylistID = ?1",
            [PLAYLIST_ID],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(title, PLAYLIST_TITLE);
    assert_eq!(owner, 1);
    assert_eq!(description.as_deref(), Some("Songs for the long drive"));

    let export_date: String = conn
        .query_row(
            "SELECT KeyValue FROM Library_Info WHERE KeyName = 'ExportDate'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(export_date, EXPORT_DATE);

    let (duration, album_source): (Option<i64>, Option<String>) = conn
        .query_row(
            "SELECT s.Duration_Seconds, a.SourceAlbumID FROM Songs s
             LEFT JOIN Albums a ON a.AlbumID = s.AlbumID
             WHERE s.VideoID = ?1",
            [SONG_1_VIDEO_ID],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(duration, Some(215));
    assert_eq!(album_source.as_deref(), Some(ALBUM_SOURCE_ID));

    let (duration, album_id): (Option<i64>, Option<i64>) = conn
        .query_row(
            "SELECT Duration_Seconds, AlbumID FROM Songs WHERE VideoID = ?1",
            [SONG_3_VIDEO_ID],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(duration, None);
    assert_eq!(album_id, None);

    let primary_source: String = conn
        .query_row(
            "SELECT a.SourceArtistID FROM Song_Artists sa
             JOIN Artists a ON a.ArtistID = sa.ArtistID
             JOIN Songs s ON s.SongID = sa.SongID
             WHERE s.VideoID = ?1 AND sa.IsPrimary = 1",
            [SONG_1_VIDEO_ID],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(primary_source, ARTIST_1_SOURCE_ID);

    let order: Vec<String> = conn
        .prepare(
            "SELECT s.VideoID FROM Playlist_Songs ps
             JOIN Songs s ON s.SongID = ps.SongID
             WHERE ps.PlaylistID = ?1 ORDER BY ps.TrackOrder",
        )
        .unwrap()
        .query_map([PLAYLIST_ID], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(order, vec![SONG_1_VIDEO_ID, SONG_2_VIDEO_ID, SONG_3_VIDEO_ID]);
}

#[test]
fn test_running_twice_changes_nothing() {
    let library = TestLibrary::with_export(&road_trip_export());

    library.run().unwrap();
    let first = table_counts(&library);
    library.run().unwrap();
    let second = table_counts(&library);

    assert_eq!(first, second);
}

#[test]
fn test_updated_export_refreshes_existing_rows() {
    let library = TestLibrary::with_export(&road_trip_export());
    library.run().unwrap();

    let mut export = road_trip_export();
    export["playlistInfo"]["title"] = "Road Trip 2024".into();
    export["songs"][0]["thumbnails"] = serde_json::json!([{ "url": "https://img.example/new.jpg" }]);
    // Reversed order
    let songs = export["songs"].as_array_mut().unwrap();
    songs.reverse();
    library.rewrite_export(&export);

    let report = library.run().unwrap();
    assert_eq!(report.songs_imported, 3);

    let conn = library.connection();
    let title: String = conn
        .query_row("SELECT Title FROM Playlists", [], |r| r.get(0))
        .unwrap();
    assert_eq!(title, "Road Trip 2024");

    let thumbnails: Vec<String> = conn
        .prepare(
            "SELECT t.URL FROM Thumbnails t JOIN Songs s ON s.SongID = t.SongID
             WHERE s.VideoID = ?1",
        )
        .unwrap()
        .query_map([SONG_1_VIDEO_ID], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(thumbnails, vec!["https://img.example/new.jpg".to_string()]);

    let first_track: String = conn
        .query_row(
            "SELECT s.VideoID FROM Playlist_Songs ps JOIN Songs s ON s.SongID = ps.SongID
             WHERE ps.TrackOrder = 1",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(first_track, SONG_3_VIDEO_ID);
    assert_eq!(library.count("Playlist_Songs"), 3);
}

#[test]
fn test_missing_input_touches_no_database() {
    let library = TestLibrary::with_export(&road_trip_export());
    std::fs::remove_file(&library.export_path).unwrap();

    let result = library.run();

    match result {
        Err(ImportError::Load(LoadError::NotFound(path))) => {
            assert_eq!(path, library.export_path)
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(!library.db_path.exists());
}

#[test]
fn test_malformed_input_touches_no_database() {
    let library = TestLibrary::with_raw_export("{ \"exportDate\": \"2024\", ");

    let result = library.run();

    assert!(matches!(
        result,
        Err(ImportError::Load(LoadError::Parse { .. }))
    ));
    assert!(!library.db_path.exists());
}

#[test]
fn test_input_missing_required_field_is_rejected() {
    let mut export = road_trip_export();
    export["songs"][1]
        .as_object_mut()
        .unwrap()
        .remove("videoId");
    let library = TestLibrary::with_export(&export);

    let result = library.run();

    assert!(matches!(
        result,
        Err(ImportError::Load(LoadError::Parse { .. }))
    ));
}

#[test]
fn test_dry_run_leaves_library_empty() {
    let mut library = TestLibrary::with_export(&road_trip_export());
    library.dry_run = true;

    let report = library.run().unwrap();

    assert_eq!(report.outcome, ImportOutcome::RolledBack);
    assert_eq!(report.songs_imported, 3);
    assert!(table_counts(&library).iter().all(|(_, count)| *count == 0));
}

#[test]
fn test_abort_policy_leaves_previous_import_intact() {
    let mut library = TestLibrary::with_export(&road_trip_export());
    library.run().unwrap();
    let before = table_counts(&library);

    library
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_update BEFORE UPDATE ON Songs
             WHEN NEW.VideoID = 'vid-rest'
             BEGIN SELECT RAISE(ABORT, 'song rejected'); END;",
        )
        .unwrap();
    let mut export = road_trip_export();
    export["songs"][0]["title"] = "Highway Song (Remastered)".into();
    library.rewrite_export(&export);
    library.error_policy = ErrorPolicy::Abort;

    let err = library.run().unwrap_err();

    match err {
        ImportError::Entity(e) => {
            assert_eq!(e.kind, EntityKind::Song);
            assert_eq!(e.entity, "Rest Stop");
        }
        other => panic!("Expected entity error, got {:?}", other),
    }
    assert_eq!(table_counts(&library), before);
    let title: String = library
        .connection()
        .query_row(
            "SELECT Title FROM Songs WHERE VideoID = ?1",
            [SONG_1_VIDEO_ID],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(title, "Highway Song");
}

#[test]
fn test_continue_policy_records_failure_and_commits_the_rest() {
    let library = TestLibrary::with_export(&road_trip_export());
    LibraryStore::open(&library.db_path)
        .unwrap()
        .close()
        .unwrap();
    library
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_song BEFORE INSERT ON Songs
             WHEN NEW.VideoID = 'vid-desert'
             BEGIN SELECT RAISE(ABORT, 'song rejected'); END;",
        )
        .unwrap();

    let report = library.run().unwrap();

    assert_eq!(report.outcome, ImportOutcome::Committed);
    assert_eq!(report.songs_imported, 2);
    assert_eq!(report.songs_skipped, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, EntityKind::Song);
    assert_eq!(report.failures[0].entity, "Desert Night");

    assert_eq!(library.count("Songs"), 2);
    assert_eq!(library.count("Playlist_Songs"), 2);
    let rest_stop_order: i64 = library
        .connection()
        .query_row(
            "SELECT ps.TrackOrder FROM Playlist_Songs ps JOIN Songs s ON s.SongID = ps.SongID
             WHERE s.VideoID = ?1",
            [SONG_3_VIDEO_ID],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(rest_stop_order, 3);
}

#[test]
fn test_foreign_database_is_rejected() {
    let library = TestLibrary::with_export(&road_trip_export());
    library
        .connection()
        .execute("CREATE TABLE notes (id INTEGER PRIMARY KEY)", [])
        .unwrap();

    let result = library.run();

    assert!(matches!(result, Err(ImportError::Connection(_))));
}
