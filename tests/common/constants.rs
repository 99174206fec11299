//! Shared constants for integration tests
//!
//! When the fixture export changes, update only this file.

pub const PLAYLIST_ID: &str = "PLroadtrip01";
pub const PLAYLIST_TITLE: &str = "Road Trip";

pub const EXPORT_DATE: &str = "2024-03-01T10:15:00Z";
pub const APP_VERSION: &str = "1.8.2";

/// Video id of "Highway Song", on "Open Roads" by The Test Band and Jazz Ensemble
pub const SONG_1_VIDEO_ID: &str = "vid-highway";

/// Video id of "Desert Night", on "Open Roads" by The Test Band
pub const SONG_2_VIDEO_ID: &str = "vid-desert";

/// Video id of "Rest Stop", no album, no artists
pub const SONG_3_VIDEO_ID: &str = "vid-rest";

pub const ALBUM_SOURCE_ID: &str = "MPREb_openroads";

pub const ARTIST_1_SOURCE_ID: &str = "UC_testband";
pub const ARTIST_2_SOURCE_ID: &str = "UC_jazzensemble";
