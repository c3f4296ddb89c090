// src/services/departures.rs

//! Departure poller.
//!
//! Runs the `Idle -> Fetching -> {Success, Failed} -> Idle` cycle until
//! cancelled. Successful cycles publish a snapshot; failed cycles are
//! logged and publish nothing, so the display keeps its last good board.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{
    AnnouncementSet, Config, DeparturePublication, DepartureRecord, DepartureSnapshot,
    LocatorSet,
};
use crate::services::{AnnouncementExtractor, Extractor, FieldGroups};

/// Slack on top of the extraction timeout before the cycle is abandoned.
const CYCLE_GRACE: Duration = Duration::from_secs(1);

/// Zip the three field groups by position into departure records.
///
/// The record count is the length of the shortest group; trailing
/// elements of longer groups are dropped.
pub fn zip_records(groups: &FieldGroups) -> Vec<DepartureRecord> {
    let (lines, times, directions) = (&groups.lines, &groups.times, &groups.directions);

    if lines.len() != times.len() || times.len() != directions.len() {
        log::debug!(
            "Field count mismatch (lines={}, times={}, directions={}); truncating",
            lines.len(),
            times.len(),
            directions.len()
        );
    }

    lines
        .iter()
        .zip(times)
        .zip(directions)
        .map(|((line, time), direction)| DepartureRecord::new(line, time, direction))
        .collect()
}

/// Repeatedly extracts the departure board and publishes snapshots.
pub struct DeparturePoller {
    extractor: Arc<dyn Extractor>,
    url: String,
    locators: LocatorSet,
    announcements: AnnouncementExtractor,
    timeout: Duration,
    interval: Duration,
}

impl DeparturePoller {
    /// Create a poller for the departures endpoint in `config`.
    pub fn new(config: &Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let url = config.departures_url()?.to_string();
        Ok(Self {
            extractor,
            url,
            locators: config.locators.clone(),
            announcements: AnnouncementExtractor::from_locators(&config.locators),
            timeout: config.departures.timeout(),
            interval: config.departures.interval(),
        })
    }

    /// Override the extraction timeout and the inter-cycle delay.
    pub fn with_timing(mut self, timeout: Duration, interval: Duration) -> Self {
        self.timeout = timeout;
        self.interval = interval;
        self
    }

    /// Run one extraction cycle.
    pub async fn poll_once(&self) -> Result<DeparturePublication> {
        let bound = self.timeout + CYCLE_GRACE;
        let groups = tokio::time::timeout(
            bound,
            self.extractor.extract(&self.url, &self.locators, self.timeout),
        )
        .await
        .map_err(|_| AppError::timeout("extraction cycle", bound))??;

        let records = zip_records(&groups);
        let announcements =
            AnnouncementSet::from_option(self.announcements.extract(&groups.document));

        Ok(DeparturePublication {
            snapshot: DepartureSnapshot::new(records),
            announcements,
        })
    }

    /// Poll until `cancel` fires or the receiving side goes away.
    ///
    /// The delay between cycles is measured from the end of each cycle.
    pub async fn run(self, tx: mpsc::Sender<DeparturePublication>, cancel: CancellationToken) {
        log::info!(
            "Departure poller started for {} (timeout {:?}, interval {:?})",
            self.url,
            self.timeout,
            self.interval
        );

        let mut cycle: u64 = 0;
        let mut failures: u64 = 0;

        while !cancel.is_cancelled() {
            cycle += 1;

            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.poll_once() => outcome,
            };

            match outcome {
                Ok(publication) => {
                    log::debug!(
                        "Cycle {}: {} departures, {} announcement(s)",
                        cycle,
                        publication.snapshot.len(),
                        publication.announcements.iter().count()
                    );
                    let sent = tokio::select! {
                        _ = cancel.cancelled() => break,
                        sent = tx.send(publication) => sent,
                    };
                    if sent.is_err() {
                        log::info!("Display task closed; stopping departure poller");
                        break;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    failures += 1;
                    log::warn!("Departure cycle {} failed: {}", cycle, e);
                }
                Err(e) => {
                    failures += 1;
                    log::error!("Departure cycle {} cannot succeed as configured: {}", cycle, e);
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        log::info!(
            "Departure poller stopped after {} cycle(s), {} failed",
            cycle,
            failures
        );
    }
}
