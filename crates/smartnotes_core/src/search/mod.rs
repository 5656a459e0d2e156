//! Read-only note queries.
//!
//! # Responsibility
//! - Expose substring + exact-tag search layered on the note store.
//! - Keep search result shaping inside core.

pub mod substring;
