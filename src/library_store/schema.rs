//! SQLite schema definitions for the playlist library database.
//!
//! Table and column names follow the library's relational layout so that the
//! importer can target databases shared with other tools. Songs, artists and
//! albums use integer surrogate keys with unique source ids for upserts.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const PLAYLIST_FK: ForeignKey = ForeignKey {
    foreign_table: "Playlists",
    foreign_column: "PlaylistID",
    on_delete: ForeignKeyOnChange::Cascade,
};

const SONG_FK: ForeignKey = ForeignKey {
    foreign_table: "Songs",
    foreign_column: "SongID",
    on_delete: ForeignKeyOnChange::Cascade,
};

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "Artists",
    foreign_column: "ArtistID",
    on_delete: ForeignKeyOnChange::Cascade,
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "Albums",
    foreign_column: "AlbumID",
    on_delete: ForeignKeyOnChange::SetNull,
};

// =============================================================================
// Core Tables
// =============================================================================

const PLAYLISTS_TABLE: Table = Table {
    name: "Playlists",
    columns: &[
        sqlite_column!("PlaylistID", &SqlType::Text, is_primary_key = true),
        sqlite_column!("Title", &SqlType::Text, non_null = true),
        sqlite_column!("UserID", &SqlType::Integer, non_null = true),
        sqlite_column!("Description", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// Key/value metadata about the export the library was last loaded from.
const LIBRARY_INFO_TABLE: Table = Table {
    name: "Library_Info",
    columns: &[
        sqlite_column!("KeyName", &SqlType::Text, is_primary_key = true),
        sqlite_column!("KeyValue", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

const ARTISTS_TABLE: Table = Table {
    name: "Artists",
    columns: &[
        sqlite_column!("ArtistID", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("Name", &SqlType::Text, non_null = true),
        sqlite_column!("SourceArtistID", &SqlType::Text, is_unique = true), // NULL for local artists
    ],
    indices: &[("idx_artists_name", "Name")],
    unique_constraints: &[],
};

const ALBUMS_TABLE: Table = Table {
    name: "Albums",
    columns: &[
        sqlite_column!("AlbumID", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("Title", &SqlType::Text, non_null = true),
        sqlite_column!("SourceAlbumID", &SqlType::Text, is_unique = true),
    ],
    indices: &[("idx_albums_title", "Title")],
    unique_constraints: &[],
};

const SONGS_TABLE: Table = Table {
    name: "Songs",
    columns: &[
        sqlite_column!("SongID", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("Title", &SqlType::Text, non_null = true),
        sqlite_column!("Duration_Seconds", &SqlType::Integer),
        sqlite_column!("VideoID", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("AlbumID", &SqlType::Integer, foreign_key = Some(&ALBUM_FK)),
    ],
    indices: &[("idx_songs_album", "AlbumID")],
    unique_constraints: &[],
};

// =============================================================================
// Song-owned and Junction Tables
// =============================================================================

const SONG_ARTISTS_TABLE: Table = Table {
    name: "Song_Artists",
    columns: &[
        sqlite_column!(
            "SongID",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!(
            "ArtistID",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!("IsPrimary", &SqlType::Integer, non_null = true), // 0/1
    ],
    indices: &[("idx_song_artists_artist", "ArtistID")],
    unique_constraints: &[&["SongID", "ArtistID"]],
};

const THUMBNAILS_TABLE: Table = Table {
    name: "Thumbnails",
    columns: &[
        sqlite_column!("ThumbnailID", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "SongID",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!("URL", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_thumbnails_song", "SongID")],
    unique_constraints: &[],
};

const FILE_PATHS_TABLE: Table = Table {
    name: "FilePaths",
    columns: &[
        sqlite_column!("FilePathID", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "SongID",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!("FilePathURL", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

const PLAYLIST_SONGS_TABLE: Table = Table {
    name: "Playlist_Songs",
    columns: &[
        sqlite_column!(
            "PlaylistID",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&PLAYLIST_FK)
        ),
        sqlite_column!(
            "SongID",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&SONG_FK)
        ),
        sqlite_column!("TrackOrder", &SqlType::Integer, non_null = true), // 1-based
    ],
    indices: &[("idx_playlist_songs_song", "SongID")],
    unique_constraints: &[&["PlaylistID", "SongID"]],
};

/// Library schema versions. There is no migration path: a database whose
/// stored version differs from the latest one is rejected.
pub const LIBRARY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        PLAYLISTS_TABLE,
        LIBRARY_INFO_TABLE,
        ARTISTS_TABLE,
        ALBUMS_TABLE,
        SONGS_TABLE,
        SONG_ARTISTS_TABLE,
        THUMBNAILS_TABLE,
        FILE_PATHS_TABLE,
        PLAYLIST_SONGS_TABLE,
    ],
}];

/// Table names in dependency order, parents first.
pub const LIBRARY_TABLE_NAMES: &[&str] = &[
    "Playlists",
    "Library_Info",
    "Artists",
    "Albums",
    "Songs",
    "Song_Artists",
    "Thumbnails",
    "FilePaths",
    "Playlist_Songs",
];
