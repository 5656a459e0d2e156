//! Translation of core failures into HTTP responses.
//!
//! # Invariants
//! - Client errors carry a human-readable message.
//! - Server errors are logged in full and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::Serialize;
use smartnotes_core::{tag_choices, ErrorKind, NoteServiceError, NoteValidationError, RepoError};

pub const MISSING_FIELDS_MESSAGE: &str = "Title, content, and tag are required";
pub const NOT_FOUND_MESSAGE: &str = "Note not found";
pub const NOTES_NOT_ARRAY_MESSAGE: &str = "Notes must be an array";
pub const STORE_INIT_MESSAGE: &str = "Database initialization failed";

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps a service failure; `fallback` is the message for server errors.
    pub fn from_service(err: NoteServiceError, fallback: &'static str) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::bad_request(client_message(&err)),
            ErrorKind::NotFound => Self::not_found(NOT_FOUND_MESSAGE),
            ErrorKind::StoreUnavailable | ErrorKind::Internal => {
                error!(
                    "event=request_failed module=http status=error kind={:?} error={}",
                    err.kind(),
                    err
                );
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }

    /// Maps a failure to obtain the shared store.
    pub fn store_init(err: RepoError) -> Self {
        error!("event=store_unavailable module=http status=error error={err}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, STORE_INIT_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Message for one validation failure, worded as existing clients expect.
pub fn validation_message(err: &NoteValidationError) -> String {
    match err {
        NoteValidationError::MissingField(_) => MISSING_FIELDS_MESSAGE.to_string(),
        NoteValidationError::InvalidTag(_) => {
            format!("Invalid tag. Must be one of: {}", tag_choices())
        }
    }
}

fn client_message(err: &NoteServiceError) -> String {
    match err {
        NoteServiceError::Validation(inner) => validation_message(inner),
        NoteServiceError::InvalidBatchEntry { index, error } => {
            format!("notes[{index}]: {}", validation_message(error))
        }
        NoteServiceError::InvalidPayload(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, MISSING_FIELDS_MESSAGE};
    use axum::http::StatusCode;
    use smartnotes_core::{NoteServiceError, NoteValidationError, RepoError};

    #[test]
    fn validation_maps_to_bad_request_with_client_wording() {
        let err = ApiError::from_service(
            NoteValidationError::MissingField("content").into(),
            "Failed to create note",
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), MISSING_FIELDS_MESSAGE);

        let err = ApiError::from_service(
            NoteValidationError::InvalidTag("x".to_string()).into(),
            "Failed to create note",
        );
        assert_eq!(
            err.message(),
            "Invalid tag. Must be one of: Work, Personal, Study, Other"
        );
    }

    #[test]
    fn batch_entry_errors_name_the_index() {
        let err = ApiError::from_service(
            NoteServiceError::InvalidBatchEntry {
                index: 3,
                error: NoteValidationError::MissingField("id"),
            },
            "Failed to sync notes",
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("notes[3]: "));
    }

    #[test]
    fn malformed_payload_keeps_its_message() {
        let err = ApiError::from_service(
            NoteServiceError::InvalidPayload("Notes must be an array".to_string()),
            "Failed to sync notes",
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Notes must be an array");
    }

    #[test]
    fn storage_failures_hide_details() {
        let err = ApiError::from_service(
            RepoError::StoreUnavailable("disk on fire".to_string()).into(),
            "Failed to fetch notes",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to fetch notes");
    }
}
