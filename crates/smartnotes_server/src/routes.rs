//! Axum route handlers for the notes API.
//!
//! Handlers only decode requests, call the core service and encode the
//! result; note rules live in `smartnotes_core`.

use crate::error::{ApiError, ErrorBody};
use crate::payload::{
    json_body, note_body, query_params, HealthResponse, ListParams, SearchRequest, SyncRequest,
};
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{SecondsFormat, Utc};
use log::error;
use serde_json::{json, Value};
use smartnotes_core::{CreateOutcome, Note, NoteInput, SqliteNoteService, StoreContext};
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub store: StoreContext,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: StoreContext) -> Self {
        Self {
            store,
            started_at: Instant::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Runs `op` against the note service on the blocking thread pool.
///
/// SQLite calls (and the first store open) block, so they stay off the
/// async workers.
async fn with_service<T, F>(state: SharedState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SqliteNoteService) -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let service = state.store.service().map_err(ApiError::store_init)?;
        op(service)
    })
    .await
    .map_err(|err| {
        error!("event=blocking_task module=http status=error error={err}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?
}

// GET /api/notes?query=&tag=
pub async fn list_notes(
    State(state): State<SharedState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let params = query_params(params)?;
    let notes = with_service(state, move |service| {
        let notes = if params.is_search() {
            service.search_notes(&params.to_query())
        } else {
            service.list_notes()
        };
        notes.map_err(|err| ApiError::from_service(err, "Failed to fetch notes"))
    })
    .await?;
    Ok(Json(notes))
}

// GET /api/notes/:id
pub async fn get_note(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note = with_service(state, move |service| {
        service
            .get_note(&id)
            .map_err(|err| ApiError::from_service(err, "Failed to fetch note"))
    })
    .await?;
    Ok(Json(note))
}

// POST /api/notes
pub async fn create_note(
    State(state): State<SharedState>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let input = json_body(payload)?;
    let (note, outcome) = with_service(state, move |service| {
        service
            .create_note(&input)
            .map_err(|err| ApiError::from_service(err, "Failed to create note"))
    })
    .await?;
    let status = match outcome {
        CreateOutcome::Created => StatusCode::CREATED,
        CreateOutcome::Replaced => StatusCode::OK,
    };
    Ok((status, Json(note)))
}

// PUT /api/notes/:id
pub async fn update_note(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Note>, ApiError> {
    let note = with_service(state, move |service| {
        let input = match note_body(&body) {
            Ok(input) => input,
            Err(decode_err) => {
                // An unknown id is reported before a malformed body.
                service
                    .get_note(&id)
                    .map_err(|err| ApiError::from_service(err, "Failed to update note"))?;
                return Err(decode_err);
            }
        };
        service
            .update_note(&id, &input)
            .map_err(|err| ApiError::from_service(err, "Failed to update note"))
    })
    .await?;
    Ok(Json(note))
}

// DELETE /api/notes/:id
pub async fn delete_note(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_service(state, move |service| {
        service
            .delete_note(&id)
            .map_err(|err| ApiError::from_service(err, "Failed to delete note"))
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/notes/search
pub async fn search_notes(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<Vec<Note>>, ApiError> {
    let query = SearchRequest::from_bytes(&body)?.to_query();
    let notes = with_service(state, move |service| {
        service
            .search_notes(&query)
            .map_err(|err| ApiError::from_service(err, "Failed to search notes"))
    })
    .await?;
    Ok(Json(notes))
}

// POST /api/notes/sync
pub async fn sync_notes(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let request = SyncRequest::from_json(json_body(payload)?)
        .map_err(|err| ApiError::from_service(err, "Failed to sync notes"))?;
    let notes = with_service(state, move |service| {
        service
            .sync_notes(&request.notes)
            .map_err(|err| ApiError::from_service(err, "Failed to sync notes"))
    })
    .await?;
    Ok(Json(notes))
}

// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Smart Notes API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "endpoints": {
            "health": "/health",
            "notes": "/api/notes",
            "get all notes": "GET /api/notes",
            "get note by id": "GET /api/notes/:id",
            "create note": "POST /api/notes",
            "update note": "PUT /api/notes/:id",
            "delete note": "DELETE /api/notes/:id",
            "search notes": "POST /api/notes/search",
            "sync notes": "POST /api/notes/sync"
        }
    }))
}

pub async fn route_not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Route not found".to_string(),
        }),
    )
}
