use crate::library_store::{EntityKind, UpsertError};
use std::fmt;

/// An entity that could not be written and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    pub kind: EntityKind,
    pub entity: String,
    pub reason: String,
}

impl From<&UpsertError> for EntityFailure {
    fn from(err: &UpsertError) -> Self {
        EntityFailure {
            kind: err.kind,
            entity: err.entity.clone(),
            reason: err.source.to_string(),
        }
    }
}

impl fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\": {}", self.kind, self.entity, self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportOutcome {
    #[default]
    Committed,
    /// Dry run: the walk completed and was rolled back.
    RolledBack,
}

/// What an import run wrote. Counters count successful writes, including
/// writes that refreshed an existing row. `albums` and `artists` count
/// distinct rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub playlist_id: String,
    pub playlist_title: String,
    pub songs_total: usize,
    pub songs_imported: usize,
    pub songs_skipped: usize,
    pub albums: usize,
    pub artists: usize,
    pub artist_links: usize,
    pub thumbnails: usize,
    pub file_paths: usize,
    pub playlist_links: usize,
    pub failures: Vec<EntityFailure>,
    pub outcome: ImportOutcome,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
