use serde::Deserialize;

/// A playlist export as produced by the music app's "export library" feature.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: String,
    pub app_version: String,
    pub playlist_info: PlaylistInfo,
    pub songs: Vec<ExportSong>,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub playlist_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSong {
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    pub video_id: String,
    #[serde(default)]
    pub album: Option<ExportAlbum>,
    #[serde(default)]
    pub artists: Option<Vec<ExportArtist>>,
    #[serde(default)]
    pub thumbnails: Option<Vec<ExportThumbnail>>,
    /// Local file URL of the downloaded audio, if any.
    #[serde(default)]
    pub url: Option<String>,
}

impl ExportSong {
    pub fn artists(&self) -> &[ExportArtist] {
        self.artists.as_deref().unwrap_or_default()
    }

    pub fn thumbnails(&self) -> &[ExportThumbnail] {
        self.thumbnails.as_deref().unwrap_or_default()
    }

    /// Duration rounded to whole seconds. Negative or non-finite values are
    /// treated as unknown.
    pub fn duration_secs(&self) -> Option<i64> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.round() as i64)
    }

    pub fn file_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct ExportAlbum {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct ExportArtist {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct ExportThumbnail {
    pub url: String,
}
