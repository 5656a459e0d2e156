//! Case-insensitive substring search with an optional exact tag filter.
//!
//! # Responsibility
//! - Match notes whose title or content contains the query text.
//! - Restrict results to one tag when a filter is supplied.
//!
//! # Invariants
//! - Pure read: never mutates storage.
//! - Empty query text matches every note.
//! - Results keep the same creation order as a full listing.
//! - Query text is literal; `%` and `_` carry no wildcard meaning.

use crate::model::note::{Note, NoteTag};
use crate::repo::note_repo::{parse_note_row, RepoResult, NOTE_SELECT_SQL};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSearchQuery {
    /// Substring to look for; empty means "any".
    pub text: String,
    /// Exact, case-sensitive tag literal. `None` disables tag filtering.
    pub tag: Option<String>,
}

impl NoteSearchQuery {
    /// Creates a text-only query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }

    /// Builds a query from raw request parameters.
    ///
    /// Absent or empty values disable the corresponding filter.
    pub fn from_raw(text: Option<&str>, tag: Option<&str>) -> Self {
        Self {
            text: text.unwrap_or_default().to_string(),
            tag: tag.filter(|value| !value.is_empty()).map(str::to_string),
        }
    }

    /// Restricts the query to one tag literal.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Runs a search against the notes table.
///
/// A tag filter that is not one of the known tags matches nothing.
pub fn search_notes(conn: &Connection, query: &NoteSearchQuery) -> RepoResult<Vec<Note>> {
    let tag_filter = match query.tag.as_deref() {
        None => None,
        Some(raw) => match NoteTag::parse(raw) {
            Some(tag) => Some(tag),
            None => return Ok(Vec::new()),
        },
    };

    let mut sql = format!("{NOTE_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();
    if let Some(tag) = tag_filter {
        sql.push_str(" AND tag = ?");
        bind_values.push(Value::Text(tag.as_str().to_string()));
    }
    sql.push_str(" ORDER BY rowid ASC;");

    let needle = query.text.to_lowercase();
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        let note = parse_note_row(row)?;
        if text_matches(&note, &needle) {
            notes.push(note);
        }
    }

    Ok(notes)
}

/// `needle` must already be lowercased.
fn text_matches(note: &Note, needle: &str) -> bool {
    needle.is_empty()
        || note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
}
