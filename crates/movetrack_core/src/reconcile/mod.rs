//! Snapshot diff classification.
//!
//! # Responsibility
//! - Detect row deletions and cell edits between two snapshot states.
//! - Stay pure: classification only, no store access.
//!
//! # Invariants
//! - Rows are identified by their stable id, never by name.
//! - Deletion detection is a full id set difference, so removing several
//!   rows in one pass is handled.
//! - Positionally paired rows with different ids are reordering artifacts,
//!   not edits.

use crate::model::item::ItemId;
use crate::projection::SnapshotRow;
use std::collections::HashSet;

/// One changed row detected between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEdit {
    /// Stable id of the edited item.
    pub id: ItemId,
    /// Row state before the edit.
    pub before: SnapshotRow,
    /// Row state after the edit; its embedded intervals become the update
    /// payload.
    pub after: SnapshotRow,
}

/// Returns ids present in `previous` but absent from `current`, in previous
/// snapshot order.
pub fn detect_deletions(previous: &[SnapshotRow], current: &[SnapshotRow]) -> Vec<ItemId> {
    let remaining: HashSet<ItemId> = current.iter().map(|row| row.id).collect();
    previous
        .iter()
        .map(|row| row.id)
        .filter(|id| !remaining.contains(id))
        .collect()
}

/// Returns every positionally paired row whose id matches and whose fields
/// differ.
pub fn detect_edits(previous: &[SnapshotRow], current: &[SnapshotRow]) -> Vec<RowEdit> {
    previous
        .iter()
        .zip(current.iter())
        .filter(|(before, after)| before.id == after.id && before != after)
        .map(|(before, after)| RowEdit {
            id: after.id,
            before: before.clone(),
            after: after.clone(),
        })
        .collect()
}
