//! Note identifier generation.
//!
//! # Responsibility
//! - Produce fresh note ids when a client does not supply one.
//! - Let callers inject deterministic generators for tests.
//!
//! # Invariants
//! - Generators never return an empty string.
//! - Uniqueness against stored notes is enforced by the repository, which
//!   regenerates on collision.

use crate::model::note::NoteId;
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Source of new note identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> NoteId;
}

impl<F> IdGenerator for F
where
    F: Fn() -> NoteId + Send + Sync,
{
    fn next_id(&self) -> NoteId {
        self()
    }
}

/// Millisecond wall clock followed by a random base-36 suffix.
///
/// Matches the id shape produced by existing offline clients, e.g.
/// `1718000000000k3j9x0a2b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRandomIdGenerator;

impl IdGenerator for TimeRandomIdGenerator {
    fn next_id(&self) -> NoteId {
        let mut rng = rand::thread_rng();
        let suffix = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
            .collect::<String>();
        format!("{}{suffix}", Utc::now().timestamp_millis())
    }
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> NoteId {
        Uuid::new_v4().to_string()
    }
}
