//! Departure data structures.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One row of the departure board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepartureRecord {
    /// Line identifier (e.g. "5")
    pub line: String,

    /// Departure time as shown on the board (e.g. "3 min")
    pub scheduled_time: String,

    /// Final stop of the run
    pub direction: String,
}

impl DepartureRecord {
    pub fn new(
        line: impl Into<String>,
        scheduled_time: impl Into<String>,
        direction: impl Into<String>,
    ) -> Self {
        Self {
            line: line.into(),
            scheduled_time: scheduled_time.into(),
            direction: direction.into(),
        }
    }

    /// Format the record for display using a template.
    ///
    /// Supported placeholders: `{line}`, `{time}`, `{direction}`.
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{line}", &self.line)
            .replace("{time}", &self.scheduled_time)
            .replace("{direction}", &self.direction)
    }
}

/// Departure records from one successful poll cycle, in board order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartureSnapshot {
    pub records: Vec<DepartureRecord>,

    /// When the cycle that produced the records completed
    pub fetched_at: DateTime<Local>,
}

impl DepartureSnapshot {
    pub fn new(records: Vec<DepartureRecord>) -> Self {
        Self {
            records,
            fetched_at: Local::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Announcements published alongside a snapshot.
///
/// The board shows at most one banner, so this holds zero or one entries.
/// An empty set means "no banner", not a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnouncementSet(Vec<String>);

impl AnnouncementSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_option(text: Option<String>) -> Self {
        Self(text.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn joined(&self) -> String {
        self.0.join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// What the departure poller hands to the display task after a good cycle.
#[derive(Debug, Clone)]
pub struct DeparturePublication {
    pub snapshot: DepartureSnapshot,
    pub announcements: AnnouncementSet,
}
