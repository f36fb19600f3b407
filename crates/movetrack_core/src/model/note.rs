//! Journal note domain model.
//!
//! # Responsibility
//! - Define the free-text journal note record.
//!
//! # Invariants
//! - `created_at` is assigned by the store at insert and never rewritten.

use chrono::{DateTime, Utc};

/// Stable identifier for one journal note.
pub type NoteId = i64;

/// One free-text journal entry, independent of any item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Insert timestamp; editing the text leaves this unchanged.
    pub created_at: DateTime<Utc>,
}
