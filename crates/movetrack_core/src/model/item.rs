//! Tracked item domain model.
//!
//! # Responsibility
//! - Define the canonical item record and its location intervals.
//! - Validate names, date strings and interval ordering before persistence.
//!
//! # Invariants
//! - `id` is a stable surrogate key; renaming an item never changes it.
//! - Interval `start` is never later than `end` on the write path.
//! - Date strings must match `YYYY-MM-DD` exactly; chrono alone would also
//!   accept shapes like `2023-9-1`, which the UI contract forbids.
//!
//! # See also
//! - docs/architecture/data-model.md

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one tracked item.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ItemId = i64;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Validation failures raised before any store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Item name is empty or whitespace-only.
    EmptyName,
    /// Interval location is blank while other interval fields are filled.
    EmptyLocation,
    /// A date string does not parse as a strict `YYYY-MM-DD` calendar date.
    MalformedDate { field: &'static str, value: String },
    /// Interval end date precedes its start date.
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    /// Category value is not in the configured category list.
    UnknownCategory(String),
    /// Location value is not in the configured location list.
    UnknownLocation(String),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::EmptyLocation => write!(f, "interval location must not be empty"),
            Self::MalformedDate { field, value } => {
                write!(f, "invalid date `{value}` for {field}; expected YYYY-MM-DD")
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "interval end {end} precedes start {start}")
            }
            Self::UnknownCategory(value) => write!(f, "unknown category `{value}`"),
            Self::UnknownLocation(value) => write!(f, "unknown location `{value}`"),
        }
    }
}

impl Error for ItemValidationError {}

/// Scalar item fields used as the write payload for create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub category: String,
    pub owner: String,
    pub notes: String,
}

impl ItemFields {
    /// Checks write-path rules that do not depend on configuration.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        Ok(())
    }
}

/// One dated stay of an item at a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub location: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Interval {
    /// Creates an interval, rejecting end-before-start ranges.
    ///
    /// Overlap with other intervals of the same item is deliberately not
    /// checked here: an item may sit in overlapping uncertainty spans.
    pub fn new(
        location: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ItemValidationError> {
        if end < start {
            return Err(ItemValidationError::EndBeforeStart { start, end });
        }
        Ok(Self {
            location: location.into(),
            start,
            end,
        })
    }
}

/// Read model for one item with its full interval set.
///
/// Items with no intervals carry an empty vec, never a missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub owner: String,
    pub notes: String,
    /// Intervals in insertion order.
    pub intervals: Vec<Interval>,
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// `field` names the originating input in the error for diagnostics.
pub fn parse_iso_date(field: &'static str, value: &str) -> Result<NaiveDate, ItemValidationError> {
    let trimmed = value.trim();
    if !ISO_DATE_RE.is_match(trimmed) {
        return Err(ItemValidationError::MalformedDate {
            field,
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        ItemValidationError::MalformedDate {
            field,
            value: value.to_string(),
        }
    })
}
