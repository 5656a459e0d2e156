//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validator, repository, search and sync into use-case APIs.
//! - Keep HTTP layers decoupled from storage details.

pub mod note_service;
