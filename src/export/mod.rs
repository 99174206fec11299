mod load;
mod models;

pub use load::{load_export, LoadError};
pub use models::{
    ExportAlbum, ExportArtist, ExportDocument, ExportSong, ExportThumbnail, PlaylistInfo,
};
