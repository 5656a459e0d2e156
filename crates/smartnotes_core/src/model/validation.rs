//! Note field validation.
//!
//! # Responsibility
//! - Turn loosely-typed client candidates into validated [`NoteFields`].
//!
//! # Invariants
//! - Validation is pure and deterministic; it never touches storage.
//! - A field is missing when absent or equal to the empty string.
//! - Fields are checked in the order `title`, `content`, `tag`.

use crate::model::note::{NoteFields, NoteTag, NoteUpsert};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Client-supplied note candidate.
///
/// Used for create/update bodies and for each sync batch entry. Any other
/// field a client sends (including `updatedAt`) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl NoteInput {
    /// Builds a fully-populated candidate without an id.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            content: Some(content.into()),
            tag: Some(tag.into()),
        }
    }

    /// Returns this candidate with a caller-chosen id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the client id when present and non-empty.
    pub fn supplied_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|value| !value.is_empty())
    }
}

/// Validation failure for one note candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Required field absent or empty.
    MissingField(&'static str),
    /// Tag present but outside the fixed enum.
    InvalidTag(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidTag(value) => write!(
                f,
                "invalid tag `{value}`; expected one of {}",
                tag_choices()
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Validates the mutable fields of a candidate.
///
/// The candidate `id` is not inspected.
pub fn validate(candidate: &NoteInput) -> Result<NoteFields, NoteValidationError> {
    let title = required(candidate.title.as_deref(), "title")?;
    let content = required(candidate.content.as_deref(), "content")?;
    let raw_tag = required(candidate.tag.as_deref(), "tag")?;
    let tag =
        NoteTag::parse(raw_tag).ok_or_else(|| NoteValidationError::InvalidTag(raw_tag.to_string()))?;

    Ok(NoteFields {
        title: title.to_string(),
        content: content.to_string(),
        tag,
    })
}

/// Validates a sync batch entry, which must also carry its own id.
pub fn validate_sync_candidate(candidate: &NoteInput) -> Result<NoteUpsert, NoteValidationError> {
    let id = required(candidate.id.as_deref(), "id")?;
    let fields = validate(candidate)?;
    Ok(NoteUpsert {
        id: id.to_string(),
        fields,
    })
}

/// Comma-separated list of accepted tag literals.
pub fn tag_choices() -> String {
    NoteTag::ALL
        .iter()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn required<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, NoteValidationError> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(NoteValidationError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::{tag_choices, validate, validate_sync_candidate, NoteInput, NoteValidationError};
    use crate::model::note::NoteTag;

    #[test]
    fn accepts_complete_candidate() {
        let fields = validate(&NoteInput::new("A", "B", "Work")).unwrap();
        assert_eq!(fields.title, "A");
        assert_eq!(fields.content, "B");
        assert_eq!(fields.tag, NoteTag::Work);
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let err = validate(&NoteInput::new("", "B", "Work")).unwrap_err();
        assert_eq!(err, NoteValidationError::MissingField("title"));

        let err = validate(&NoteInput::new("A", "B", "")).unwrap_err();
        assert_eq!(err, NoteValidationError::MissingField("tag"));
    }

    #[test]
    fn whitespace_title_is_not_missing() {
        assert!(validate(&NoteInput::new("  ", "B", "Other")).is_ok());
    }

    #[test]
    fn missing_fields_reported_in_declaration_order() {
        let err = validate(&NoteInput::default()).unwrap_err();
        assert_eq!(err, NoteValidationError::MissingField("title"));

        let candidate = NoteInput {
            title: Some("A".to_string()),
            ..NoteInput::default()
        };
        assert_eq!(
            validate(&candidate).unwrap_err(),
            NoteValidationError::MissingField("content")
        );
    }

    #[test]
    fn unknown_or_miscased_tag_is_invalid() {
        let err = validate(&NoteInput::new("A", "B", "work")).unwrap_err();
        assert_eq!(err, NoteValidationError::InvalidTag("work".to_string()));
    }

    #[test]
    fn missing_field_wins_over_invalid_tag() {
        let err = validate(&NoteInput::new("A", "", "Bogus")).unwrap_err();
        assert_eq!(err, NoteValidationError::MissingField("content"));
    }

    #[test]
    fn sync_candidate_requires_id() {
        let err = validate_sync_candidate(&NoteInput::new("A", "B", "Study")).unwrap_err();
        assert_eq!(err, NoteValidationError::MissingField("id"));

        let upsert =
            validate_sync_candidate(&NoteInput::new("A", "B", "Study").with_id("n-1")).unwrap();
        assert_eq!(upsert.id, "n-1");
        assert_eq!(upsert.fields.tag, NoteTag::Study);
    }

    #[test]
    fn tag_choices_lists_every_tag() {
        assert_eq!(tag_choices(), "Work, Personal, Study, Other");
    }
}
