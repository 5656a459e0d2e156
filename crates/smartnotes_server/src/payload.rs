//! Request and response schemas for the notes HTTP API.
//!
//! Every endpoint body is decoded into one of these records before any core
//! call; shape errors become 400 responses here.

use crate::error::{ApiError, NOTES_NOT_ARRAY_MESSAGE};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartnotes_core::{NoteInput, NoteSearchQuery, NoteServiceError};

/// Query string of `GET /api/notes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub query: Option<String>,
    pub tag: Option<String>,
}

impl ListParams {
    /// Whether the request asks for a filtered listing.
    pub fn is_search(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.query) || present(&self.tag)
    }

    pub fn to_query(&self) -> NoteSearchQuery {
        NoteSearchQuery::from_raw(self.query.as_deref(), self.tag.as_deref())
    }
}

/// Body of `POST /api/notes/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl SearchRequest {
    /// Decodes a raw body; an empty body searches for everything.
    pub fn from_bytes(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|err| ApiError::bad_request(format!("Invalid JSON body: {err}")))
    }

    pub fn to_query(&self) -> NoteSearchQuery {
        NoteSearchQuery::from_raw(self.query.as_deref(), self.tag.as_deref())
    }
}

/// Body of `POST /api/notes/sync`.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub notes: Vec<NoteInput>,
}

impl SyncRequest {
    /// Decodes `{"notes": [...]}`.
    ///
    /// A missing or non-array `notes` gets the dedicated message; an entry
    /// with wrongly-typed fields is reported by index.
    pub fn from_json(body: Value) -> Result<Self, NoteServiceError> {
        let not_array = || NoteServiceError::InvalidPayload(NOTES_NOT_ARRAY_MESSAGE.to_string());
        let Value::Object(mut fields) = body else {
            return Err(not_array());
        };
        let Some(Value::Array(entries)) = fields.remove("notes") else {
            return Err(not_array());
        };

        let notes = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<NoteInput>(entry)
                    .map_err(|err| {
                        NoteServiceError::InvalidPayload(format!("notes[{index}]: {err}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { notes })
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the process started serving.
    pub uptime: f64,
}

/// Decodes the body of `PUT /api/notes/:id`.
///
/// An empty body decodes to an empty candidate so the existence check still
/// runs before field validation.
pub fn note_body(body: &[u8]) -> Result<NoteInput, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NoteInput::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("Invalid JSON body: {err}")))
}

/// Unwraps a query string, turning extractor rejections into JSON 400s.
pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params.map(|Query(value)| value).map_err(|rejection| {
        ApiError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    })
}

/// Unwraps a JSON body, turning extractor rejections into 400s.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    })
}
