//! Entity upserters.
//!
//! Every function takes the connection of the running import (a transaction
//! or savepoint) and writes one entity. Upserts keyed by a unique column use
//! `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`, so the returned id is the
//! id of the affected row whether it was inserted or already present.

use crate::export::{ExportAlbum, ExportArtist, ExportSong, PlaylistInfo};
use rusqlite::{params, Connection, ErrorCode};
use std::fmt;
use thiserror::Error;

pub const EXPORT_DATE_KEY: &str = "ExportDate";
pub const APP_VERSION_KEY: &str = "AppVersion";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Playlist,
    LibraryInfo,
    Artist,
    Album,
    Song,
    SongArtistLink,
    Thumbnail,
    FilePath,
    PlaylistSongLink,
    Transaction,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Playlist => "playlist",
            EntityKind::LibraryInfo => "library info",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Song => "song",
            EntityKind::SongArtistLink => "song artist link",
            EntityKind::Thumbnail => "thumbnail",
            EntityKind::FilePath => "file path",
            EntityKind::PlaylistSongLink => "playlist song link",
            EntityKind::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// A failed write, naming the entity it was about.
#[derive(Debug, Error)]
#[error("Failed to write {kind} \"{entity}\": {source}")]
pub struct UpsertError {
    pub kind: EntityKind,
    pub entity: String,
    #[source]
    pub source: rusqlite::Error,
}

impl UpsertError {
    pub fn new(kind: EntityKind, entity: impl Into<String>, source: rusqlite::Error) -> Self {
        UpsertError {
            kind,
            entity: entity.into(),
            source,
        }
    }

    pub(crate) fn savepoint(source: rusqlite::Error) -> Self {
        UpsertError::new(EntityKind::Transaction, "savepoint", source)
    }

    /// Whether the failure is about the entity's data (constraint violation,
    /// type mismatch) rather than about the database itself. Only such
    /// failures can be skipped while keeping the transaction alive.
    pub fn is_recoverable(&self) -> bool {
        match &self.source {
            rusqlite::Error::SqliteFailure(e, _) => matches!(
                e.code,
                ErrorCode::ConstraintViolation | ErrorCode::TypeMismatch
            ),
            rusqlite::Error::ToSqlConversionFailure(_) => true,
            _ => false,
        }
    }
}

/// A song that has been written, as referenced by its dependent rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongRef<'a> {
    pub id: i64,
    pub title: &'a str,
}

fn lookup_id(conn: &Connection, sql: &str, key: &str) -> rusqlite::Result<Option<i64>> {
    match conn.query_row(sql, params![key], |r| r.get(0)) {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn upsert_playlist(
    conn: &Connection,
    info: &PlaylistInfo,
    owner_user_id: i64,
) -> Result<(), UpsertError> {
    conn.execute(
        "INSERT INTO Playlists (PlaylistID, Title, UserID, Description)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(PlaylistID) DO UPDATE SET
             Title = excluded.Title,
             Description = excluded.Description",
        params![info.playlist_id, info.title, owner_user_id, info.description],
    )
    .map_err(|e| UpsertError::new(EntityKind::Playlist, &info.title, e))?;
    Ok(())
}

pub fn upsert_library_info(conn: &Connection, key: &str, value: &str) -> Result<(), UpsertError> {
    conn.execute(
        "INSERT INTO Library_Info (KeyName, KeyValue) VALUES (?1, ?2)
         ON CONFLICT(KeyName) DO UPDATE SET KeyValue = excluded.KeyValue",
        params![key, value],
    )
    .map_err(|e| UpsertError::new(EntityKind::LibraryInfo, key, e))?;
    Ok(())
}

/// Returns the ArtistID. Artists without a source id are matched by name
/// among the other artists without a source id.
pub fn upsert_artist(conn: &Connection, artist: &ExportArtist) -> Result<i64, UpsertError> {
    let to_error = |e: rusqlite::Error| UpsertError::new(EntityKind::Artist, &artist.name, e);
    match &artist.id {
        Some(source_id) => conn
            .query_row(
                "INSERT INTO Artists (Name, SourceArtistID) VALUES (?1, ?2)
                 ON CONFLICT(SourceArtistID) DO UPDATE SET Name = excluded.Name
                 RETURNING ArtistID",
                params![artist.name, source_id],
                |r| r.get(0),
            )
            .map_err(to_error),
        None => {
            let existing = lookup_id(
                conn,
                "SELECT ArtistID FROM Artists
                 WHERE SourceArtistID IS NULL AND Name = ?1
                 ORDER BY ArtistID LIMIT 1",
                &artist.name,
            )
            .map_err(to_error)?;
            match existing {
                Some(id) => Ok(id),
                None => conn
                    .query_row(
                        "INSERT INTO Artists (Name) VALUES (?1) RETURNING ArtistID",
                        params![artist.name],
                        |r| r.get(0),
                    )
                    .map_err(to_error),
            }
        }
    }
}

/// Returns the AlbumID. Albums without a source id are matched by title.
pub fn upsert_album(conn: &Connection, album: &ExportAlbum) -> Result<i64, UpsertError> {
    let to_error = |e: rusqlite::Error| UpsertError::new(EntityKind::Album, &album.name, e);
    match &album.id {
        Some(source_id) => conn
            .query_row(
                "INSERT INTO Albums (Title, SourceAlbumID) VALUES (?1, ?2)
                 ON CONFLICT(SourceAlbumID) DO UPDATE SET Title = excluded.Title
                 RETURNING AlbumID",
                params![album.name, source_id],
                |r| r.get(0),
            )
            .map_err(to_error),
        None => {
            let existing = lookup_id(
                conn,
                "SELECT AlbumID FROM Albums
                 WHERE SourceAlbumID IS NULL AND Title = ?1
                 ORDER BY AlbumID LIMIT 1",
                &album.name,
            )
            .map_err(to_error)?;
            match existing {
                Some(id) => Ok(id),
                None => conn
                    .query_row(
                        "INSERT INTO Albums (Title) VALUES (?1) RETURNING AlbumID",
                        params![album.name],
                        |r| r.get(0),
                    )
                    .map_err(to_error),
            }
        }
    }
}

/// Returns the SongID of the song keyed by its video id.
pub fn upsert_song(
    conn: &Connection,
    song: &ExportSong,
    album_id: Option<i64>,
) -> Result<i64, UpsertError> {
    conn.query_row(
        "INSERT INTO Songs (Title, Duration_Seconds, VideoID, AlbumID)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(VideoID) DO UPDATE SET
             Title = excluded.Title,
             Duration_Seconds = excluded.Duration_Seconds,
             AlbumID = excluded.AlbumID
         RETURNING SongID",
        params![song.title, song.duration_secs(), song.video_id, album_id],
        |r| r.get(0),
    )
    .map_err(|e| UpsertError::new(EntityKind::Song, &song.title, e))
}

pub fn link_song_artist(
    conn: &Connection,
    song: SongRef<'_>,
    artist_id: i64,
    artist_name: &str,
    is_primary: bool,
) -> Result<(), UpsertError> {
    conn.execute(
        "INSERT INTO Song_Artists (SongID, ArtistID, IsPrimary) VALUES (?1, ?2, ?3)
         ON CONFLICT(SongID, ArtistID) DO UPDATE SET IsPrimary = excluded.IsPrimary",
        params![song.id, artist_id, is_primary],
    )
    .map_err(|e| {
        UpsertError::new(
            EntityKind::SongArtistLink,
            format!("{} -> {}", song.title, artist_name),
            e,
        )
    })?;
    Ok(())
}

/// Clears the primary flag on every artist link of `song`. Links are kept.
pub fn demote_song_artists(conn: &Connection, song: SongRef<'_>) -> Result<usize, UpsertError> {
    conn.execute(
        "UPDATE Song_Artists SET IsPrimary = 0 WHERE SongID = ?1",
        params![song.id],
    )
    .map_err(|e| UpsertError::new(EntityKind::SongArtistLink, song.title, e))
}

/// Removes the thumbnails currently owned by `song`, returning how many.
pub fn clear_thumbnails(conn: &Connection, song: SongRef<'_>) -> Result<usize, UpsertError> {
    conn.execute("DELETE FROM Thumbnails WHERE SongID = ?1", params![song.id])
        .map_err(|e| UpsertError::new(EntityKind::Thumbnail, song.title, e))
}

pub fn insert_thumbnail(conn: &Connection, song: SongRef<'_>, url: &str) -> Result<(), UpsertError> {
    conn.execute(
        "INSERT INTO Thumbnails (SongID, URL) VALUES (?1, ?2)",
        params![song.id, url],
    )
    .map_err(|e| UpsertError::new(EntityKind::Thumbnail, url, e))?;
    Ok(())
}

pub fn upsert_file_path(
    conn: &Connection,
    song: SongRef<'_>,
    file_url: &str,
) -> Result<(), UpsertError> {
    conn.execute(
        "INSERT INTO FilePaths (SongID, FilePathURL) VALUES (?1, ?2)
         ON CONFLICT(SongID) DO UPDATE SET FilePathURL = excluded.FilePathURL",
        params![song.id, file_url],
    )
    .map_err(|e| UpsertError::new(EntityKind::FilePath, file_url, e))?;
    Ok(())
}

pub fn link_playlist_song(
    conn: &Connection,
    playlist_id: &str,
    song: SongRef<'_>,
    track_order: i64,
) -> Result<(), UpsertError> {
    conn.execute(
        "INSERT INTO Playlist_Songs (PlaylistID, SongID, TrackOrder) VALUES (?1, ?2, ?3)
         ON CONFLICT(PlaylistID, SongID) DO UPDATE SET TrackOrder = excluded.TrackOrder",
        params![playlist_id, song.id, track_order],
    )
    .map_err(|e| UpsertError::new(EntityKind::PlaylistSongLink, song.title, e))?;
    Ok(())
}
