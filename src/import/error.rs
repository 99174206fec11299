use crate::export::LoadError;
use crate::library_store::UpsertError;
use thiserror::Error;

/// Why an import run was aborted. Whenever a transaction had been started it
/// was rolled back before this error is returned.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Could not open library database: {0:#}")]
    Connection(#[source] anyhow::Error),

    #[error(transparent)]
    Entity(#[from] UpsertError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
