mod schema;
mod store;
pub mod upsert;

pub use schema::{LIBRARY_TABLE_NAMES, LIBRARY_VERSIONED_SCHEMAS};
pub use store::{ImportTransaction, LibraryCounts, LibraryStore};
pub use upsert::{EntityKind, SongRef, UpsertError};
