//! Core domain logic for MoveTrack.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use config::OptionLists;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Interval, ItemFields, ItemId, ItemRecord, ItemValidationError};
pub use model::note::{Note, NoteId};
pub use projection::{IntervalPayload, SnapshotRow, TimelineRow};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository, StoreError, StoreResult};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use service::session::{ItemForm, SessionError, SessionResult, SessionService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
