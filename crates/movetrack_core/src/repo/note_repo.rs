//! Journal note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide journal-note CRUD plus the single-slot general note.
//! - Own the overwrite semantics of the general note slot.
//!
//! # Invariants
//! - Note listing order is newest first: `timestamp DESC, id DESC`.
//! - Editing a note replaces text only; its timestamp is never rewritten.
//! - `save_general_note` replaces the whole slot in a single transaction.

use crate::model::note::{Note, NoteId};
use crate::repo::item_repo::{ensure_schema_version, ensure_table, StoreError, StoreResult};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const NOTE_SELECT_SQL: &str = "SELECT id, note_text, timestamp FROM notes";

/// Repository interface for journal notes and the general note slot.
pub trait NoteRepository {
    /// Inserts one note stamped with the current UTC time.
    fn add_note(&mut self, text: &str) -> StoreResult<Note>;
    /// Loads one note by id.
    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Replaces the text of one note, keeping its timestamp.
    fn update_note(&mut self, id: NoteId, text: &str) -> StoreResult<Note>;
    /// Deletes one note. Returns `false` when the id resolves to nothing.
    fn delete_note(&mut self, id: NoteId) -> StoreResult<bool>;
    /// Lists all notes, newest first.
    fn list_notes(&self) -> StoreResult<Vec<Note>>;
    /// Overwrites the single general note slot.
    fn save_general_note(&mut self, text: &str) -> StoreResult<()>;
    /// Reads the general note slot; empty string when never written.
    fn general_note(&self) -> StoreResult<String>;
}

/// SQLite-backed journal note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table(conn, "notes", &["id", "note_text", "timestamp"])?;
        ensure_table(conn, "general_notes", &["id", "notes"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add_note(&mut self, text: &str) -> StoreResult<Note> {
        self.conn.execute(
            "INSERT INTO notes (note_text, timestamp) VALUES (?1, ?2);",
            params![text, format_timestamp(Utc::now())],
        )?;
        let id = self.conn.last_insert_rowid();

        // Read back so the returned note matches later reads exactly.
        self.get_note(id)?
            .ok_or_else(|| StoreError::InvalidData("created note missing in read-back".to_string()))
    }

    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn update_note(&mut self, id: NoteId, text: &str) -> StoreResult<Note> {
        let changed = self.conn.execute(
            "UPDATE notes SET note_text = ?2 WHERE id = ?1;",
            params![id, text],
        )?;
        if changed == 0 {
            return Err(StoreError::NoteNotFound(id));
        }

        self.get_note(id)?
            .ok_or_else(|| StoreError::InvalidData("updated note missing in read-back".to_string()))
    }

    fn delete_note(&mut self, id: NoteId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY timestamp DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn save_general_note(&mut self, text: &str) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM general_notes;", [])?;
        tx.execute(
            "INSERT INTO general_notes (id, notes) VALUES (1, ?1);",
            [text],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn general_note(&self) -> StoreResult<String> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT notes FROM general_notes ORDER BY id ASC LIMIT 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or_default())
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    // Fixed-width RFC 3339 keeps SQL text ordering equal to time ordering.
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let timestamp_text: String = row.get("timestamp")?;
    Ok(Note {
        id: row.get("id")?,
        text: row.get("note_text")?,
        created_at: parse_stored_timestamp(&timestamp_text)?,
    })
}

fn parse_stored_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // Rows created through SQLite's `datetime('now')` default carry this
    // shape; treat it as UTC.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            StoreError::InvalidData(format!("invalid timestamp `{value}` in notes.timestamp"))
        })
}
