//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for items and notes.
//! - Isolate SQLite query details from session orchestration.
//!
//! # Invariants
//! - Repository writes validate input before any SQL mutation.
//! - Multi-step mutations run inside one immediate transaction; no partial
//!   write is ever visible.
//! - Repository APIs return semantic errors (`ItemNotFound`, `NoteNotFound`)
//!   in addition to DB transport errors.

pub mod item_repo;
pub mod note_repo;
