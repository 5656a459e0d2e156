//! Core domain logic for the SmartNotes service.
//! This crate is the single source of truth for note invariants and the
//! offline sync merge.

pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod sync;

pub use context::{IdStrategy, SqliteNoteService, StoreContext, StoreLocation};
pub use logging::{default_log_level, init_logging};
pub use model::note::{Note, NoteFields, NoteId, NoteTag, NoteUpsert};
pub use model::validation::{
    tag_choices, validate, validate_sync_candidate, NoteInput, NoteValidationError,
};
pub use repo::clock::{Clock, SystemClock};
pub use repo::id_gen::{IdGenerator, TimeRandomIdGenerator, UuidIdGenerator};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use search::substring::{search_notes, NoteSearchQuery};
pub use service::note_service::{CreateOutcome, ErrorKind, NoteService, NoteServiceError};
pub use sync::reconcile::{SyncError, SyncReconciler};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
