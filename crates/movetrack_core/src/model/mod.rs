//! Domain model for tracked items, location intervals and journal notes.
//!
//! # Responsibility
//! - Define canonical data structures used by store and projection logic.
//! - Own input validation rules for names, dates and interval ordering.
//!
//! # Invariants
//! - Every persisted object is identified by a stable integer id.
//! - Dates are strict ISO-8601 calendar dates (`YYYY-MM-DD`).
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod item;
pub mod note;
