//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted record served by the notes API.
//! - Define the closed tag classification attached to every note.
//!
//! # Invariants
//! - `id` identifies at most one stored note at any time.
//! - `title` and `content` are never empty for a persisted note.
//! - `updated_at` is assigned by the store, never by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque stable note identifier.
///
/// Either supplied by a client (offline-created notes) or generated by the
/// store when absent.
pub type NoteId = String;

/// Closed classification attached to every note.
///
/// Transmitted and persisted as the literal variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteTag {
    Work,
    Personal,
    Study,
    Other,
}

impl NoteTag {
    /// Every accepted tag, in the order used by error messages.
    pub const ALL: [NoteTag; 4] = [
        NoteTag::Work,
        NoteTag::Personal,
        NoteTag::Study,
        NoteTag::Other,
    ];

    /// Returns the wire/storage literal for this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Study => "Study",
            Self::Other => "Other",
        }
    }

    /// Parses an exact, case-sensitive tag literal.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Work" => Some(Self::Work),
            "Personal" => Some(Self::Personal),
            "Study" => Some(Self::Study),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Display for NoteTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted note as returned by every read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub tag: NoteTag,
    /// Moment of the last create/update, millisecond precision.
    pub updated_at: DateTime<Utc>,
}

/// Validated mutable fields of a note.
///
/// Only produced by [`crate::model::validation::validate`] or by reading a
/// persisted note, so values always satisfy the note invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub tag: NoteTag,
}

/// Validated sync entry: a caller-chosen id plus the fields to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpsert {
    pub id: NoteId,
    pub fields: NoteFields,
}
