//! Playlist export importer.
//!
//! Reads a JSON playlist export and folds it into a local SQLite music
//! library with idempotent upserts, all inside one transaction.

pub mod config;
pub mod export;
pub mod import;
pub mod library_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use config::{ErrorPolicy, ImportConfig};
pub use export::{load_export, ExportDocument};
pub use import::{import_document, run_import, ImportError, ImportOptions, ImportReport};
pub use library_store::LibraryStore;
