//! Offline sync reconciliation.
//!
//! # Responsibility
//! - Merge batches of client-held notes into the note store.
//!
//! # Invariants
//! - A batch is applied completely or not at all.

pub mod reconcile;
