//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over normalized `items` + `intervals` storage.
//! - Keep SQL details inside the store persistence boundary.
//!
//! # Invariants
//! - Write paths validate fields before SQL mutations.
//! - An item's interval set is only ever replaced wholesale, inside the same
//!   transaction as the scalar update.
//! - Read paths reject unparseable persisted dates instead of masking them.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{
    parse_iso_date, Interval, ItemFields, ItemId, ItemRecord, ItemValidationError,
};
use crate::model::note::NoteId;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT id, name, category, assigned_owner, notes FROM items";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer error shared by item and note persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Input failed a write-path validation rule.
    Validation(ItemValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Target journal note does not exist.
    NoteNotFound(NoteId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "store requires column `{column}` in table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for StoreError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    /// Creates one item with its interval set and returns the new id.
    fn create_item(&mut self, fields: &ItemFields, intervals: &[Interval]) -> StoreResult<ItemId>;
    /// Loads one item with its intervals in insertion order.
    fn get_item(&self, id: ItemId) -> StoreResult<Option<ItemRecord>>;
    /// Lists every item with its intervals, items in insertion order.
    fn list_items(&self) -> StoreResult<Vec<ItemRecord>>;
    /// Updates scalar fields; `Some` interval list (even empty) replaces the
    /// whole stored set, `None` leaves intervals untouched.
    fn update_item(
        &mut self,
        id: ItemId,
        fields: &ItemFields,
        intervals: Option<&[Interval]>,
    ) -> StoreResult<()>;
    /// Deletes one item and all of its intervals. Returns `false` when the
    /// id resolves to nothing; repeated deletes are not an error.
    fn delete_item(&mut self, id: ItemId) -> StoreResult<bool>;
}

/// SQLite-backed item repository.
#[derive(Debug)]
pub struct SqliteItemRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table(conn, "items", &["id", "name", "category", "assigned_owner", "notes"])?;
        ensure_table(
            conn,
            "intervals",
            &["id", "item_id", "location", "start_date", "end_date"],
        )?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&mut self, fields: &ItemFields, intervals: &[Interval]) -> StoreResult<ItemId> {
        fields.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO items (name, category, assigned_owner, notes)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                fields.name.as_str(),
                fields.category.as_str(),
                fields.owner.as_str(),
                fields.notes.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_intervals_in_tx(&tx, id, intervals)?;
        tx.commit()?;

        Ok(id)
    }

    fn get_item(&self, id: ItemId) -> StoreResult<Option<ItemRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            let mut record = parse_item_row(row)?;
            record.intervals = load_intervals_for_item(self.conn, id)?;
            return Ok(Some(record));
        }

        Ok(None)
    }

    fn list_items(&self) -> StoreResult<Vec<ItemRecord>> {
        let mut records = Vec::new();
        let mut index_by_id: HashMap<ItemId, usize> = HashMap::new();

        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let record = parse_item_row(row)?;
            index_by_id.insert(record.id, records.len());
            records.push(record);
        }

        let mut stmt = self.conn.prepare(
            "SELECT item_id, location, start_date, end_date
             FROM intervals
             ORDER BY item_id ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let item_id: ItemId = row.get("item_id")?;
            if let Some(&index) = index_by_id.get(&item_id) {
                records[index].intervals.push(parse_interval_row(row)?);
            }
        }

        Ok(records)
    }

    fn update_item(
        &mut self,
        id: ItemId,
        fields: &ItemFields,
        intervals: Option<&[Interval]>,
    ) -> StoreResult<()> {
        fields.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE items
             SET name = ?2, category = ?3, assigned_owner = ?4, notes = ?5
             WHERE id = ?1;",
            params![
                id,
                fields.name.as_str(),
                fields.category.as_str(),
                fields.owner.as_str(),
                fields.notes.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::ItemNotFound(id));
        }

        if let Some(list) = intervals {
            tx.execute("DELETE FROM intervals WHERE item_id = ?1;", [id])?;
            insert_intervals_in_tx(&tx, id, list)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_item(&mut self, id: ItemId) -> StoreResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM intervals WHERE item_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM items WHERE id = ?1;", [id])?;
        tx.commit()?;

        Ok(changed > 0)
    }
}

fn insert_intervals_in_tx(
    tx: &Transaction<'_>,
    item_id: ItemId,
    intervals: &[Interval],
) -> StoreResult<()> {
    for interval in intervals {
        tx.execute(
            "INSERT INTO intervals (item_id, location, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                item_id,
                interval.location.as_str(),
                interval.start.to_string(),
                interval.end.to_string(),
            ],
        )?;
    }
    Ok(())
}

fn load_intervals_for_item(conn: &Connection, item_id: ItemId) -> StoreResult<Vec<Interval>> {
    let mut stmt = conn.prepare(
        "SELECT location, start_date, end_date
         FROM intervals
         WHERE item_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([item_id])?;
    let mut intervals = Vec::new();
    while let Some(row) = rows.next()? {
        intervals.push(parse_interval_row(row)?);
    }
    Ok(intervals)
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<ItemRecord> {
    Ok(ItemRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        owner: row.get("assigned_owner")?,
        notes: row.get("notes")?,
        intervals: Vec::new(),
    })
}

fn parse_interval_row(row: &Row<'_>) -> StoreResult<Interval> {
    let location: String = row.get("location")?;
    let start = parse_stored_date(row, "start_date")?;
    let end = parse_stored_date(row, "end_date")?;
    // Inverted ranges persisted by older tooling are tolerated on read so
    // legacy rows keep listing and projecting.
    Ok(Interval {
        location,
        start,
        end,
    })
}

fn parse_stored_date(row: &Row<'_>, column: &'static str) -> StoreResult<NaiveDate> {
    let text: String = row.get(column)?;
    parse_iso_date(column, &text).map_err(|_| {
        StoreError::InvalidData(format!("invalid date `{text}` in intervals.{column}"))
    })
}

pub(crate) fn ensure_schema_version(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn ensure_table(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> StoreResult<()> {
    if !table_exists(conn, table)? {
        return Err(StoreError::MissingRequiredTable(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(StoreError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
