//! Note domain model and validation.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the validator that guards every write path.
//!
//! # Invariants
//! - Only validated [`note::NoteFields`] reach the repository layer.

pub mod note;
pub mod validation;
