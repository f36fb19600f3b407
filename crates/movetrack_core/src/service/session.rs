//! Editing-session façade over store, projection and reconciliation.
//!
//! # Responsibility
//! - Own the SQLite connection and the configured option lists.
//! - Normalize submitted editor forms into validated store writes.
//! - Turn grid-level deletions and cell edits back into store mutations.
//! - Serve snapshot and timeline projections for rendering.
//!
//! # Invariants
//! - Every mutation returns a snapshot re-read from the store, never an
//!   echo of caller input.
//! - An edit pass validates every changed row before the first write.
//! - Store access is serialized through one mutex-guarded connection.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::config::OptionLists;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::item::{Interval, ItemFields, ItemId, ItemRecord, ItemValidationError};
use crate::model::note::{Note, NoteId};
use crate::projection::{
    decode_intervals, timeline_from_snapshot, to_snapshot, to_timeline, DecodeError,
    IntervalPayload, SnapshotRow, TimelineRow,
};
use crate::reconcile::{detect_deletions, detect_edits, RowEdit};
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository, StoreError};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Result alias for session use-cases.
pub type SessionResult<T> = Result<T, SessionError>;

/// Service error for session use-cases.
#[derive(Debug)]
pub enum SessionError {
    /// Submitted input failed a validation rule.
    Validation(ItemValidationError),
    /// Edited interval text could not be decoded.
    Decode(DecodeError),
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Target journal note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Store(StoreError),
    /// The connection mutex was poisoned by a panicking holder.
    LockPoisoned,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::ItemNotFound(item_id) => write!(f, "item not found: {item_id}"),
            Self::NoteNotFound(note_id) => write!(f, "note not found: {note_id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "session connection lock poisoned"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            StoreError::ItemNotFound(item_id) => Self::ItemNotFound(item_id),
            StoreError::NoteNotFound(note_id) => Self::NoteNotFound(note_id),
            other => Self::Store(other),
        }
    }
}

impl From<ItemValidationError> for SessionError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Store(StoreError::Db(value))
    }
}

/// One submitted editor form: scalar fields plus raw interval rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub category: String,
    pub owner: String,
    pub notes: String,
    pub intervals: Vec<IntervalPayload>,
}

/// Session façade owning one store connection.
pub struct SessionService {
    conn: Mutex<Connection>,
    options: OptionLists,
}

impl SessionService {
    /// Wraps an already-opened connection after probing store readiness.
    pub fn try_new(mut conn: Connection, options: OptionLists) -> SessionResult<Self> {
        let _ = SqliteItemRepository::try_new(&mut conn)?;
        let _ = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            options,
        })
    }

    /// Opens (and migrates) the store at `path` and wraps it in a session.
    pub fn open(path: impl AsRef<Path>, options: OptionLists) -> SessionResult<Self> {
        let conn = open_db(path)?;
        Self::try_new(conn, options)
    }

    /// Opens an in-memory store, mainly for tests and probes.
    pub fn open_in_memory(options: OptionLists) -> SessionResult<Self> {
        let conn = open_db_in_memory()?;
        Self::try_new(conn, options)
    }

    /// Configured category/location/owner option lists.
    pub fn options(&self) -> &OptionLists {
        &self.options
    }

    /// Reads the authoritative snapshot of all items.
    pub fn get_snapshot(&self) -> SessionResult<Vec<SnapshotRow>> {
        let mut conn = self.lock_conn()?;
        read_snapshot(&mut conn)
    }

    /// Validates and persists one submitted form, then re-reads the snapshot.
    ///
    /// `edit_id` selects update semantics; `None` creates a new item.
    pub fn submit_item(
        &self,
        form: &ItemForm,
        edit_id: Option<ItemId>,
    ) -> SessionResult<Vec<SnapshotRow>> {
        let mut conn = self.lock_conn()?;
        let intervals = collect_form_intervals(&form.intervals)?;
        {
            let mut repo = SqliteItemRepository::try_new(&mut conn)?;
            match edit_id {
                Some(item_id) => {
                    let existing = repo
                        .get_item(item_id)?
                        .ok_or(SessionError::ItemNotFound(item_id))?;
                    let fields = self.admitted_fields(form, Some(&existing))?;
                    self.check_locations(&intervals, Some(&existing))?;
                    repo.update_item(item_id, &fields, Some(intervals.as_slice()))?;
                    info!("event=item_submit module=session status=ok mode=update item_id={item_id}");
                }
                None => {
                    let fields = self.admitted_fields(form, None)?;
                    self.check_locations(&intervals, None)?;
                    let item_id = repo.create_item(&fields, &intervals)?;
                    info!("event=item_submit module=session status=ok mode=create item_id={item_id}");
                }
            }
        }
        read_snapshot(&mut conn)
    }

    /// Applies row removals detected between two snapshots.
    ///
    /// Every id present in `previous` but absent from `current` is deleted.
    /// Ids that no longer resolve are logged and skipped so a repeated pass
    /// stays idempotent.
    pub fn delete_rows(
        &self,
        previous: &[SnapshotRow],
        current: &[SnapshotRow],
    ) -> SessionResult<Vec<SnapshotRow>> {
        let mut conn = self.lock_conn()?;
        let removed = detect_deletions(previous, current);
        {
            let mut repo = SqliteItemRepository::try_new(&mut conn)?;
            for item_id in removed {
                if repo.delete_item(item_id)? {
                    info!("event=row_delete module=session status=ok item_id={item_id}");
                } else {
                    warn!("event=row_delete module=session status=skip item_id={item_id} reason=missing");
                }
            }
        }
        read_snapshot(&mut conn)
    }

    /// Applies cell edits detected between two snapshots.
    ///
    /// Every changed row is decoded and validated before the first write, so
    /// one bad row aborts the whole pass with the store untouched.
    pub fn apply_edits(
        &self,
        previous: &[SnapshotRow],
        current: &[SnapshotRow],
    ) -> SessionResult<Vec<SnapshotRow>> {
        let mut conn = self.lock_conn()?;
        let edits = detect_edits(previous, current);
        let mut admitted = Vec::with_capacity(edits.len());
        for edit in &edits {
            admitted.push(self.admitted_edit(edit)?);
        }
        {
            let mut repo = SqliteItemRepository::try_new(&mut conn)?;
            for (item_id, fields, intervals) in &admitted {
                repo.update_item(*item_id, fields, Some(intervals.as_slice()))?;
                info!("event=row_edit module=session status=ok item_id={item_id}");
            }
        }
        read_snapshot(&mut conn)
    }

    /// Flattens a snapshot the caller already holds into timeline rows.
    pub fn get_timeline(&self, snapshot: &[SnapshotRow]) -> Vec<TimelineRow> {
        timeline_from_snapshot(snapshot)
    }

    /// Reads timeline rows straight from the store.
    pub fn timeline(&self) -> SessionResult<Vec<TimelineRow>> {
        let mut conn = self.lock_conn()?;
        let repo = SqliteItemRepository::try_new(&mut conn)?;
        let records = repo.list_items()?;
        Ok(to_timeline(&records))
    }

    /// Adds one journal note stamped with the current time.
    pub fn add_note(&self, text: &str) -> SessionResult<Note> {
        let mut conn = self.lock_conn()?;
        let mut repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.add_note(text)?)
    }

    /// Gets one journal note by id.
    pub fn get_note(&self, note_id: NoteId) -> SessionResult<Option<Note>> {
        let mut conn = self.lock_conn()?;
        let repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.get_note(note_id)?)
    }

    /// Replaces one note's text, keeping its original timestamp.
    pub fn update_note(&self, note_id: NoteId, text: &str) -> SessionResult<Note> {
        let mut conn = self.lock_conn()?;
        let mut repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.update_note(note_id, text)?)
    }

    /// Deletes one journal note. Returns whether a note was removed.
    pub fn delete_note(&self, note_id: NoteId) -> SessionResult<bool> {
        let mut conn = self.lock_conn()?;
        let mut repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.delete_note(note_id)?)
    }

    /// Lists journal notes newest first.
    pub fn list_notes(&self) -> SessionResult<Vec<Note>> {
        let mut conn = self.lock_conn()?;
        let repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.list_notes()?)
    }

    /// Overwrites the single general note slot.
    pub fn save_general_note(&self, text: &str) -> SessionResult<()> {
        let mut conn = self.lock_conn()?;
        let mut repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.save_general_note(text)?)
    }

    /// Reads the general note slot; empty string when never saved.
    pub fn general_note(&self) -> SessionResult<String> {
        let mut conn = self.lock_conn()?;
        let repo = SqliteNoteRepository::try_new(&mut conn)?;
        Ok(repo.general_note()?)
    }

    fn lock_conn(&self) -> SessionResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SessionError::LockPoisoned)
    }

    /// Normalizes scalar form fields into an admitted write payload.
    ///
    /// A blank category falls back to the first configured one; the category
    /// must then be configured, except that an item keeps passing with the
    /// category it already has stored.
    fn admitted_fields(
        &self,
        form: &ItemForm,
        existing: Option<&ItemRecord>,
    ) -> SessionResult<ItemFields> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(ItemValidationError::EmptyName.into());
        }

        let category = match form.category.trim() {
            "" => self.options.default_category().to_string(),
            value => value.to_string(),
        };
        let stored = existing.map(|record| record.category.as_str());
        if !self.options.allows_category(&category) && stored != Some(category.as_str()) {
            return Err(ItemValidationError::UnknownCategory(category).into());
        }

        Ok(ItemFields {
            name: name.to_string(),
            category,
            owner: form.owner.trim().to_string(),
            notes: form.notes.clone(),
        })
    }

    /// Checks that every interval location is configured, tolerating
    /// locations the item already has stored.
    fn check_locations(
        &self,
        intervals: &[Interval],
        existing: Option<&ItemRecord>,
    ) -> SessionResult<()> {
        for interval in intervals {
            if self.options.allows_location(&interval.location) {
                continue;
            }
            let stored = existing.is_some_and(|record| {
                record
                    .intervals
                    .iter()
                    .any(|known| known.location == interval.location)
            });
            if !stored {
                return Err(ItemValidationError::UnknownLocation(interval.location.clone()).into());
            }
        }
        Ok(())
    }

    /// Decodes and validates one edited row into an update payload.
    fn admitted_edit(&self, edit: &RowEdit) -> SessionResult<(ItemId, ItemFields, Vec<Interval>)> {
        let intervals = decode_intervals(&edit.after.intervals).map_err(|err| match err {
            DecodeError::Invalid(validation) => SessionError::Validation(validation),
            other => SessionError::Decode(other),
        })?;

        // The before row carries the stored values used for grandfathering.
        let reference = edit_reference(&edit.before);
        let form = ItemForm {
            name: edit.after.name.clone(),
            category: edit.after.category.clone(),
            owner: edit.after.owner.clone(),
            notes: edit.after.notes.clone(),
            intervals: Vec::new(),
        };
        let fields = self.admitted_fields(&form, Some(&reference))?;
        self.check_locations(&intervals, Some(&reference))?;
        Ok((edit.id, fields, intervals))
    }
}

fn read_snapshot(conn: &mut Connection) -> SessionResult<Vec<SnapshotRow>> {
    let repo = SqliteItemRepository::try_new(conn)?;
    let records = repo.list_items()?;
    Ok(to_snapshot(&records))
}

/// Drops fully blank interval rows and validates the rest.
fn collect_form_intervals(payloads: &[IntervalPayload]) -> SessionResult<Vec<Interval>> {
    let mut intervals = Vec::new();
    for payload in payloads {
        // Untouched "add interval" editor rows arrive fully blank.
        if payload.is_blank() {
            continue;
        }
        intervals.push(payload.to_interval()?);
    }
    Ok(intervals)
}

/// Rebuilds the stored reference state from a before-edit snapshot row.
fn edit_reference(before: &SnapshotRow) -> ItemRecord {
    ItemRecord {
        id: before.id,
        name: before.name.clone(),
        category: before.category.clone(),
        owner: before.owner.clone(),
        notes: before.notes.clone(),
        intervals: decode_intervals(&before.intervals).unwrap_or_default(),
    }
}
