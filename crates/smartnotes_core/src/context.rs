//! Process-wide store handle.
//!
//! # Responsibility
//! - Open the note store exactly once and share it with every caller.
//!
//! # Invariants
//! - Concurrent first callers block on one initialization; none opens a
//!   second connection.
//! - A failed initialization leaves the context empty, so the next call
//!   retries instead of serving without a store.

use crate::db::{open_db, open_db_in_memory};
use crate::repo::id_gen::{TimeRandomIdGenerator, UuidIdGenerator};
use crate::repo::note_repo::{RepoError, RepoResult, SqliteNoteRepository};
use crate::service::note_service::NoteService;
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

/// Shared service type handed to request handlers.
pub type SqliteNoteService = NoteService<SqliteNoteRepository>;

/// Where the note database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

impl StoreLocation {
    /// Parses a configured path; `:memory:` selects an in-memory database.
    pub fn from_config(value: &str) -> Self {
        if value == ":memory:" {
            Self::Memory
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

/// Generator used for id-less creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    #[default]
    TimeRandom,
    Uuid,
}

impl IdStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time-random" | "time_random" => Some(Self::TimeRandom),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }
}

/// Lazily-initialized note service shared by all requests.
pub struct StoreContext {
    location: StoreLocation,
    id_strategy: IdStrategy,
    service: OnceCell<SqliteNoteService>,
}

impl StoreContext {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            id_strategy: IdStrategy::default(),
            service: OnceCell::new(),
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Returns whether initialization has completed.
    pub fn is_ready(&self) -> bool {
        self.service.get().is_some()
    }

    /// Returns the shared service, opening the store on first use.
    ///
    /// # Errors
    /// - [`RepoError::StoreUnavailable`] when the database cannot be opened
    ///   or migrated.
    pub fn service(&self) -> RepoResult<&SqliteNoteService> {
        self.service.get_or_try_init(|| self.open_service())
    }

    fn open_service(&self) -> RepoResult<SqliteNoteService> {
        let conn = match &self.location {
            StoreLocation::File(path) => open_db(path),
            StoreLocation::Memory => open_db_in_memory(),
        }
        .map_err(|err| {
            error!("event=store_init module=context status=error error={err}");
            RepoError::StoreUnavailable(err.to_string())
        })?;

        let repo = SqliteNoteRepository::try_new(conn)?;
        let repo = match self.id_strategy {
            IdStrategy::TimeRandom => repo.with_id_generator(TimeRandomIdGenerator),
            IdStrategy::Uuid => repo.with_id_generator(UuidIdGenerator),
        };

        info!(
            "event=store_init module=context status=ok id_strategy={:?}",
            self.id_strategy
        );
        Ok(NoteService::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use super::{IdStrategy, StoreLocation};
    use std::path::PathBuf;

    #[test]
    fn memory_marker_selects_in_memory_store() {
        assert_eq!(StoreLocation::from_config(":memory:"), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::from_config("notes.db"),
            StoreLocation::File(PathBuf::from("notes.db"))
        );
    }

    #[test]
    fn id_strategy_parses_known_names() {
        assert_eq!(IdStrategy::parse("UUID"), Some(IdStrategy::Uuid));
        assert_eq!(IdStrategy::parse("time-random"), Some(IdStrategy::TimeRandom));
        assert_eq!(IdStrategy::parse("ulid"), None);
    }
}
