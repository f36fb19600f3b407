//! Snapshot and timeline projections over store records.
//!
//! # Responsibility
//! - Flatten normalized item records into the denormalized editing snapshot
//!   and the one-row-per-interval timeline table.
//! - Own the embedded `Intervals` JSON codec used by snapshot rows.
//!
//! # Invariants
//! - Encoding is canonical: zero intervals encode as `"[]"`, and re-encoding
//!   a decoded field is byte-stable.
//! - Empty text and `"[]"` decode identically to "no intervals".
//! - Malformed embedded data never raises past this module on the render
//!   path; the affected row contributes zero timeline rows and the condition
//!   is logged.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::item::{parse_iso_date, Interval, ItemId, ItemRecord, ItemValidationError};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decode failure for one snapshot row's embedded interval field.
#[derive(Debug)]
pub enum DecodeError {
    /// Embedded text is not a JSON array of interval objects.
    Json(serde_json::Error),
    /// Payload dates fail strict parsing or ordering rules.
    Invalid(ItemValidationError),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "embedded intervals are not valid JSON: {err}"),
            Self::Invalid(err) => write!(f, "embedded intervals are invalid: {err}"),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

/// Wire form of one location stay inside the embedded snapshot field.
///
/// Dates stay as strings here; conversion to [`Interval`] applies the strict
/// date and ordering checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IntervalPayload {
    pub location: String,
    pub start: String,
    pub end: String,
}

impl IntervalPayload {
    /// Whether every field is blank, i.e. an untouched editor row.
    pub fn is_blank(&self) -> bool {
        self.location.trim().is_empty() && self.start.trim().is_empty() && self.end.trim().is_empty()
    }

    /// Converts to a validated model interval.
    pub fn to_interval(&self) -> Result<Interval, ItemValidationError> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(ItemValidationError::EmptyLocation);
        }
        let start = parse_iso_date("start", &self.start)?;
        let end = parse_iso_date("end", &self.end)?;
        Interval::new(location, start, end)
    }
}

impl From<&Interval> for IntervalPayload {
    fn from(value: &Interval) -> Self {
        Self {
            location: value.location.clone(),
            start: value.start.to_string(),
            end: value.end.to_string(),
        }
    }
}

/// One editable grid row: item scalars plus the embedded interval field.
///
/// The id rides along as a hidden column so edits round-trip identity even
/// after a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(rename = "Id")]
    pub id: ItemId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Assigned Owner")]
    pub owner: String,
    #[serde(rename = "Notes")]
    pub notes: String,
    /// JSON array text of `{Location, Start, End}` objects.
    #[serde(rename = "Intervals")]
    pub intervals: String,
}

/// One flattened (item x interval) record for chart rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Assigned Owner")]
    pub owner: String,
    #[serde(rename = "Notes")]
    pub notes: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Start")]
    pub start: NaiveDate,
    #[serde(rename = "End")]
    pub end: NaiveDate,
}

/// Encodes an interval set into the canonical embedded field text.
pub fn encode_intervals(intervals: &[Interval]) -> String {
    let payloads: Vec<IntervalPayload> = intervals.iter().map(IntervalPayload::from).collect();
    serde_json::to_string(&payloads).expect("interval payloads always serialize")
}

/// Decodes embedded field text into validated intervals.
///
/// Blank text and `"[]"` both decode to an empty set.
pub fn decode_intervals(text: &str) -> Result<Vec<Interval>, DecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let payloads: Vec<IntervalPayload> =
        serde_json::from_str(trimmed).map_err(DecodeError::Json)?;
    payloads
        .iter()
        .map(|payload| payload.to_interval().map_err(DecodeError::Invalid))
        .collect()
}

/// Projects store records into snapshot rows, one per item.
pub fn to_snapshot(records: &[ItemRecord]) -> Vec<SnapshotRow> {
    records
        .iter()
        .map(|record| SnapshotRow {
            id: record.id,
            name: record.name.clone(),
            category: record.category.clone(),
            owner: record.owner.clone(),
            notes: record.notes.clone(),
            intervals: encode_intervals(&record.intervals),
        })
        .collect()
}

/// Projects store records into timeline rows, one per (item, interval).
///
/// Items with zero intervals contribute zero rows.
pub fn to_timeline(records: &[ItemRecord]) -> Vec<TimelineRow> {
    let mut rows = Vec::new();
    for record in records {
        for interval in &record.intervals {
            rows.push(timeline_row(
                &record.name,
                &record.category,
                &record.owner,
                &record.notes,
                interval,
            ));
        }
    }
    rows
}

/// Rebuilds timeline rows from snapshot rows via the embedded field.
///
/// A row whose embedded data fails to decode contributes zero timeline rows;
/// the failure is logged and never propagates, so one corrupt row cannot
/// blank the whole chart.
pub fn timeline_from_snapshot(rows: &[SnapshotRow]) -> Vec<TimelineRow> {
    let mut timeline = Vec::new();
    for row in rows {
        let intervals = match decode_intervals(&row.intervals) {
            Ok(intervals) => intervals,
            Err(err) => {
                warn!(
                    "event=snapshot_decode module=projection status=error item_id={} error={err}",
                    row.id
                );
                continue;
            }
        };
        for interval in &intervals {
            timeline.push(timeline_row(
                &row.name,
                &row.category,
                &row.owner,
                &row.notes,
                interval,
            ));
        }
    }
    timeline
}

fn timeline_row(
    name: &str,
    category: &str,
    owner: &str,
    notes: &str,
    interval: &Interval,
) -> TimelineRow {
    TimelineRow {
        name: name.to_string(),
        category: category.to_string(),
        owner: owner.to_string(),
        notes: notes.to_string(),
        location: interval.location.clone(),
        start: interval.start,
        end: interval.end,
    }
}
