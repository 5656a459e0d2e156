//! Batch upsert of client notes after an offline period.
//!
//! # Responsibility
//! - Validate every entry of an incoming batch before any write.
//! - Apply the batch through one `bulk_upsert` call.
//! - Return the complete note set after the merge.
//!
//! # Invariants
//! - Entries apply in batch order; for a repeated id the last entry wins.
//! - Stored `updated_at` values are never compared with the batch, so an
//!   older client copy replaces newer server data.
//! - One invalid entry rejects the whole batch with zero writes.

use crate::model::note::{Note, NoteUpsert};
use crate::model::validation::{validate_sync_candidate, NoteInput, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sync failure.
#[derive(Debug)]
pub enum SyncError {
    /// Entry at `index` failed validation; nothing was written.
    InvalidCandidate {
        index: usize,
        error: NoteValidationError,
    },
    /// Persistence failure; the batch transaction was rolled back.
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCandidate { index, error } => write!(f, "notes[{index}]: {error}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCandidate { error, .. } => Some(error),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Applies sync batches to one note repository.
pub struct SyncReconciler<'repo, R: NoteRepository + ?Sized> {
    repo: &'repo R,
}

impl<'repo, R: NoteRepository + ?Sized> SyncReconciler<'repo, R> {
    pub fn new(repo: &'repo R) -> Self {
        Self { repo }
    }

    /// Upserts `candidates` in order and returns every stored note.
    ///
    /// # Errors
    /// - [`SyncError::InvalidCandidate`] for the first malformed entry.
    /// - [`SyncError::Repo`] when storage fails; no entry is kept.
    pub fn reconcile(&self, candidates: &[NoteInput]) -> Result<Vec<Note>, SyncError> {
        let batch = prepare_batch(candidates).inspect_err(|err| {
            warn!(
                "event=notes_sync module=sync status=rejected batch_size={} error={}",
                candidates.len(),
                err
            );
        })?;

        let distinct_ids = batch
            .iter()
            .map(|entry| entry.id.as_str())
            .collect::<HashSet<_>>()
            .len();

        self.repo.bulk_upsert(&batch)?;
        let notes = self.repo.list_notes()?;

        info!(
            "event=notes_sync module=sync status=ok batch_size={} distinct_ids={} note_count={}",
            batch.len(),
            distinct_ids,
            notes.len()
        );
        Ok(notes)
    }
}

/// Validates every entry, stopping at the first failure.
pub fn prepare_batch(candidates: &[NoteInput]) -> Result<Vec<NoteUpsert>, SyncError> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            validate_sync_candidate(candidate)
                .map_err(|error| SyncError::InvalidCandidate { index, error })
        })
        .collect()
}
