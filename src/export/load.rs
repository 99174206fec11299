//! Export file loading

use super::ExportDocument;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Export file {0:?} not found")]
    NotFound(PathBuf),

    #[error("Failed to read export file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse export file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and parses the whole export file. Nothing is returned unless the
/// entire document is valid.
pub fn load_export<P: AsRef<Path>>(path: P) -> Result<ExportDocument, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    debug!("Read {} bytes from {:?}", content.len(), path);

    let document: ExportDocument =
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    info!(
        "Loaded export {:?}: playlist \"{}\" with {} songs",
        path,
        document.playlist_info.title,
        document.songs.len()
    );
    Ok(document)
}
