// src/services/reconciler.rs

//! Positional reconciliation of departure snapshots.
//!
//! Computes the smallest set of row mutations that moves the displayed
//! board from the previous snapshot to the incoming one:
//!
//! - rows present in both with different content become [`RowOp::Update`]
//! - rows past the end of the previous board become [`RowOp::Append`]
//! - rows past the end of the incoming board are left on display
//!
//! The last rule means a board that shrinks keeps its stale tail rows.

use serde::{Deserialize, Serialize};

use crate::models::{AnnouncementSet, DepartureRecord, DepartureSnapshot};

/// A single positional display mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOp {
    /// Replace the row at `index`
    Update {
        index: usize,
        record: DepartureRecord,
    },
    /// Add a row at the end of the board; `index` is its new position
    Append {
        index: usize,
        record: DepartureRecord,
    },
}

impl RowOp {
    pub fn index(&self) -> usize {
        match self {
            Self::Update { index, .. } | Self::Append { index, .. } => *index,
        }
    }

    pub fn record(&self) -> &DepartureRecord {
        match self {
            Self::Update { record, .. } | Self::Append { record, .. } => record,
        }
    }
}

/// What the display currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Rows in display order, including any stale tail
    pub rows: Vec<DepartureRecord>,

    /// Banner text as rendered
    pub announcement: String,
}

impl DisplayState {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reconcile `incoming` into `previous`.
///
/// Returns the new state together with the ordered row operations that
/// turn the previous display into it. The announcement is always replaced
/// wholesale: an empty set renders `placeholder`.
pub fn reconcile(
    previous: &DisplayState,
    incoming: &DepartureSnapshot,
    announcements: &AnnouncementSet,
    placeholder: &str,
) -> (DisplayState, Vec<RowOp>) {
    let incoming_rows = &incoming.records;
    let shared = previous.rows.len().min(incoming_rows.len());

    let mut ops = Vec::new();

    for (index, (old, new)) in previous.rows.iter().zip(incoming_rows).enumerate() {
        if old != new {
            ops.push(RowOp::Update {
                index,
                record: new.clone(),
            });
        }
    }

    for (index, record) in incoming_rows.iter().enumerate().skip(shared) {
        ops.push(RowOp::Append {
            index,
            record: record.clone(),
        });
    }

    let mut rows = incoming_rows.clone();
    if previous.rows.len() > incoming_rows.len() {
        let stale = &previous.rows[incoming_rows.len()..];
        log::debug!("Board shrank; keeping {} stale row(s) on display", stale.len());
        rows.extend_from_slice(stale);
    }

    let announcement = if announcements.is_empty() {
        placeholder.to_string()
    } else {
        announcements.joined()
    };

    (DisplayState { rows, announcement }, ops)
}
