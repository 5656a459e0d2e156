//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note store contract used by services and sync.
//! - Isolate SQLite query details from service/business orchestration.
//! - Host the injectable id and time sources used by writes.
//!
//! # Invariants
//! - Repository writes only accept validated `NoteFields`.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateId`) in
//!   addition to DB transport errors.

pub mod clock;
pub mod id_gen;
pub mod note_repo;
