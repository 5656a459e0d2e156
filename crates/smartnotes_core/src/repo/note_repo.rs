//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable keyed storage for notes (the note store).
//! - Assign ids for id-less inserts and `updated_at` for every write.
//! - Apply sync batches as one insert-or-replace transaction.
//!
//! # Invariants
//! - Every multi-step write runs inside one IMMEDIATE transaction.
//! - Written notes are always returned from a read-back, never echoed.
//! - List order is creation order and survives updates of existing rows.
//! - `bulk_upsert` never compares timestamps: the last batch entry wins.

use crate::db::DbError;
use crate::model::note::{Note, NoteFields, NoteId, NoteTag, NoteUpsert};
use crate::model::validation::NoteValidationError;
use crate::repo::clock::{Clock, SystemClock};
use crate::repo::id_gen::{IdGenerator, TimeRandomIdGenerator};
use crate::search::substring::{search_notes, NoteSearchQuery};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub(crate) const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    tag,
    updated_at
FROM notes";

const MAX_ID_ATTEMPTS: usize = 8;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    DuplicateId(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// The id generator kept producing ids that are already stored.
    IdSpaceExhausted {
        attempts: usize,
    },
    /// Storage cannot serve requests (not initialized or lock poisoned).
    StoreUnavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateId(id) => write!(f, "note id already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::IdSpaceExhausted { attempts } => {
                write!(f, "no unused note id after {attempts} attempts")
            }
            Self::StoreUnavailable(reason) => write!(f, "note store unavailable: {reason}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note storage.
pub trait NoteRepository {
    /// Lists every note in creation order.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Gets one note by id.
    fn get_note(&self, id: &str) -> RepoResult<Option<Note>>;
    /// Returns whether a note with `id` is stored.
    fn note_exists(&self, id: &str) -> RepoResult<bool>;
    /// Inserts a new note, generating an id when `id` is `None`.
    ///
    /// Fails with [`RepoError::DuplicateId`] when a supplied id is taken.
    fn insert_note(&self, id: Option<&str>, fields: &NoteFields) -> RepoResult<Note>;
    /// Replaces title/content/tag of an existing note.
    fn update_note(&self, id: &str, fields: &NoteFields) -> RepoResult<Note>;
    /// Permanently deletes one note.
    fn delete_note(&self, id: &str) -> RepoResult<()>;
    /// Inserts or replaces every entry, in order, as one transaction.
    fn bulk_upsert(&self, notes: &[NoteUpsert]) -> RepoResult<()>;
    /// Substring/tag query over stored notes.
    fn search_notes(&self, query: &NoteSearchQuery) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note store.
///
/// Owns its connection behind a mutex so one instance can be shared by
/// every request handler.
pub struct SqliteNoteRepository {
    conn: Mutex<Connection>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl SqliteNoteRepository {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Uses [`TimeRandomIdGenerator`] and [`SystemClock`].
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            ids: Box::new(TimeRandomIdGenerator),
            clock: Box::new(SystemClock),
        })
    }

    /// Replaces the id generator used for id-less inserts.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replaces the clock used for `updated_at`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            RepoError::StoreUnavailable("note store connection lock poisoned".to_string())
        })
    }

    fn now_for_db(&self) -> String {
        timestamp_to_db(self.clock.now())
    }

    fn generate_unused_id(&self, conn: &Connection) -> RepoResult<NoteId> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !candidate.is_empty() && !note_exists_in(conn, &candidate)? {
                return Ok(candidate);
            }
            debug!("event=note_id_collision module=repo status=retry attempt={attempt}");
        }
        warn!("event=note_id_collision module=repo status=error attempts={MAX_ID_ATTEMPTS}");
        Err(RepoError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get_note(&self, id: &str) -> RepoResult<Option<Note>> {
        let conn = self.lock()?;
        fetch_note(&conn, id)
    }

    fn note_exists(&self, id: &str) -> RepoResult<bool> {
        let conn = self.lock()?;
        note_exists_in(&conn, id)
    }

    fn insert_note(&self, id: Option<&str>, fields: &NoteFields) -> RepoResult<Note> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id = match id {
            Some(id) => {
                if note_exists_in(&tx, id)? {
                    return Err(RepoError::DuplicateId(id.to_string()));
                }
                id.to_string()
            }
            None => self.generate_unused_id(&tx)?,
        };

        tx.execute(
            "INSERT INTO notes (id, title, content, tag, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.as_str(),
                fields.title.as_str(),
                fields.content.as_str(),
                fields.tag.as_str(),
                self.now_for_db(),
            ],
        )?;

        let note = fetch_note(&tx, &id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted note `{id}` missing in read-back"))
        })?;
        tx.commit()?;
        Ok(note)
    }

    fn update_note(&self, id: &str, fields: &NoteFields) -> RepoResult<Note> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE notes
             SET
                title = ?2,
                content = ?3,
                tag = ?4,
                updated_at = ?5
             WHERE id = ?1;",
            params![
                id,
                fields.title.as_str(),
                fields.content.as_str(),
                fields.tag.as_str(),
                self.now_for_db(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        let note = fetch_note(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("updated note `{id}` missing in read-back"))
        })?;
        tx.commit()?;
        Ok(note)
    }

    fn delete_note(&self, id: &str) -> RepoResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn bulk_upsert(&self, notes: &[NoteUpsert]) -> RepoResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated_at = self.now_for_db();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO notes (id, title, content, tag, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    tag = excluded.tag,
                    updated_at = excluded.updated_at;",
            )?;
            for note in notes {
                stmt.execute(params![
                    note.id.as_str(),
                    note.fields.title.as_str(),
                    note.fields.content.as_str(),
                    note.fields.tag.as_str(),
                    updated_at.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn search_notes(&self, query: &NoteSearchQuery) -> RepoResult<Vec<Note>> {
        let conn = self.lock()?;
        search_notes(&conn, query)
    }
}

/// Formats a timestamp the way it is persisted (RFC 3339, millisecond, `Z`).
pub fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: String = row.get("id")?;

    let tag_text: String = row.get("tag")?;
    let tag = NoteTag::parse(&tag_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid tag `{tag_text}` in notes.tag"))
    })?;

    let updated_text: String = row.get("updated_at")?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_text)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{updated_text}` in notes.updated_at"
            ))
        })?
        .with_timezone(&Utc);

    let title: String = row.get("title")?;
    let content: String = row.get("content")?;
    if title.is_empty() || content.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "note `{id}` has an empty title or content"
        )));
    }

    Ok(Note {
        id,
        title,
        content,
        tag,
        updated_at,
    })
}

fn fetch_note(conn: &Connection, id: &str) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    let note = match rows.next()? {
        Some(row) => Some(parse_note_row(row)?),
        None => None,
    };
    Ok(note)
}

fn note_exists_in(conn: &Connection, id: &str) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM notes WHERE id = ?1;", [id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in ["id", "title", "content", "tag", "updated_at"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
