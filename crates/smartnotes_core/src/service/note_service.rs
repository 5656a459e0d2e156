//! Note use-case service.
//!
//! # Responsibility
//! - Provide create/read/update/delete/search/sync entry points.
//! - Run the validator before any write reaches the repository.
//! - Classify failures into the error taxonomy exposed to transports.
//!
//! # Invariants
//! - Create with a client id that already exists replaces that note.
//! - Update checks existence before validating the payload.
//! - Service layer remains storage-agnostic.

use crate::model::note::{Note, NoteId};
use crate::model::validation::{validate, NoteInput, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::search::substring::NoteSearchQuery;
use crate::sync::reconcile::{SyncError, SyncReconciler};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse failure class used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller sent a bad payload; never retried.
    Validation,
    /// Unknown note id.
    NotFound,
    /// Storage not initialized or failing.
    StoreUnavailable,
    /// Anything else; details are logged, not returned.
    Internal,
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// One note candidate failed validation.
    Validation(NoteValidationError),
    /// A sync batch entry failed validation.
    InvalidBatchEntry {
        index: usize,
        error: NoteValidationError,
    },
    /// Request body does not have the expected shape.
    InvalidPayload(String),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl NoteServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidBatchEntry { .. } | Self::InvalidPayload(_) => {
                ErrorKind::Validation
            }
            Self::NoteNotFound(_) => ErrorKind::NotFound,
            Self::Repo(
                RepoError::Db(_)
                | RepoError::StoreUnavailable(_)
                | RepoError::MissingRequiredTable(_)
                | RepoError::MissingRequiredColumn { .. },
            ) => ErrorKind::StoreUnavailable,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidBatchEntry { index, error } => write!(f, "notes[{index}]: {error}"),
            Self::InvalidPayload(message) => write!(f, "invalid payload: {message}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidBatchEntry { error, .. } => Some(error),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<SyncError> for NoteServiceError {
    fn from(value: SyncError) -> Self {
        match value {
            SyncError::InvalidCandidate { index, error } => {
                Self::InvalidBatchEntry { index, error }
            }
            SyncError::Repo(err) => err.into(),
        }
    }
}

/// Whether a create call inserted a new note or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Replaced,
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every note in creation order.
    pub fn list_notes(&self) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes()?)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: &str) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)?
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))
    }

    /// Creates a note, or replaces it when the supplied id already exists.
    ///
    /// Offline clients pick their own ids, so re-posting a note they already
    /// uploaded must not fail.
    pub fn create_note(
        &self,
        input: &NoteInput,
    ) -> Result<(Note, CreateOutcome), NoteServiceError> {
        let fields = validate(input)?;

        let (note, outcome) = match input.supplied_id() {
            None => (self.repo.insert_note(None, &fields)?, CreateOutcome::Created),
            Some(id) => match self.repo.insert_note(Some(id), &fields) {
                Ok(note) => (note, CreateOutcome::Created),
                Err(RepoError::DuplicateId(_)) => {
                    (self.repo.update_note(id, &fields)?, CreateOutcome::Replaced)
                }
                Err(err) => return Err(err.into()),
            },
        };

        info!(
            "event=note_create module=service status=ok outcome={} id={}",
            match outcome {
                CreateOutcome::Created => "created",
                CreateOutcome::Replaced => "replaced",
            },
            note.id
        );
        Ok((note, outcome))
    }

    /// Replaces title, content and tag of an existing note.
    pub fn update_note(&self, id: &str, input: &NoteInput) -> Result<Note, NoteServiceError> {
        if !self.repo.note_exists(id)? {
            return Err(NoteServiceError::NoteNotFound(id.to_string()));
        }

        let fields = validate(input)?;
        let note = self.repo.update_note(id, &fields)?;
        info!("event=note_update module=service status=ok id={}", note.id);
        Ok(note)
    }

    /// Permanently deletes a note.
    pub fn delete_note(&self, id: &str) -> Result<(), NoteServiceError> {
        self.repo.delete_note(id)?;
        info!("event=note_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Substring + tag search.
    pub fn search_notes(&self, query: &NoteSearchQuery) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.search_notes(query)?)
    }

    /// Merges an offline batch and returns the full note set.
    pub fn sync_notes(&self, candidates: &[NoteInput]) -> Result<Vec<Note>, NoteServiceError> {
        Ok(SyncReconciler::new(&self.repo).reconcile(candidates)?)
    }
}
