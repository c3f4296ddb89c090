// src/services/display.rs

//! Display task.
//!
//! The single owner of [`DisplayState`]. Receives departure publications
//! and weather payloads, reconciles departures against what is on screen,
//! and forwards the results to a [`DisplaySink`] in arrival order.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::models::{DeparturePublication, WeatherPayload};
use crate::services::reconciler::{DisplayState, RowOp, reconcile};

/// Cadence of the loading animation.
const LOADING_TICK: Duration = Duration::from_millis(500);

/// Consumer of reconciled updates.
///
/// Row operations must be applied in the order given. The sink shows a
/// loading state from `show_loading` until the first `apply_departures`
/// and never returns to it.
pub trait DisplaySink: Send {
    fn show_loading(&mut self);

    fn apply_departures(
        &mut self,
        ops: &[RowOp],
        announcement: &str,
        fetched_at: DateTime<Local>,
    );

    fn apply_weather(&mut self, payload: &WeatherPayload);

    /// Animation tick while still loading.
    fn tick(&mut self) {}
}

/// Inbound channels of the display task.
pub struct DisplayInputs {
    pub departures: mpsc::Receiver<DeparturePublication>,
    pub weather: mpsc::Receiver<WeatherPayload>,
}

/// Drive `sink` until cancelled or both producers have gone away.
///
/// Returns the final display state.
pub async fn run_display<S: DisplaySink>(
    sink: &mut S,
    inputs: DisplayInputs,
    placeholder: &str,
    cancel: CancellationToken,
) -> DisplayState {
    let DisplayInputs {
        mut departures,
        mut weather,
    } = inputs;

    let mut state = DisplayState::default();
    let mut loaded = false;
    let mut departures_open = true;
    let mut weather_open = true;
    let mut ticker = tokio::time::interval(LOADING_TICK);

    sink.show_loading();

    while departures_open || weather_open {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            publication = departures.recv(), if departures_open => match publication {
                Some(publication) => {
                    let (next, ops) = reconcile(
                        &state,
                        &publication.snapshot,
                        &publication.announcements,
                        placeholder,
                    );
                    if ops.is_empty() {
                        log::debug!("Board unchanged");
                    } else {
                        log::debug!("Applying {} row op(s)", ops.len());
                    }
                    sink.apply_departures(
                        &ops,
                        &next.announcement,
                        publication.snapshot.fetched_at,
                    );
                    state = next;
                    loaded = true;
                }
                None => departures_open = false,
            },

            payload = weather.recv(), if weather_open => match payload {
                Some(payload) => sink.apply_weather(&payload),
                None => weather_open = false,
            },

            _ = ticker.tick(), if !loaded => sink.tick(),
        }
    }

    log::info!("Display task stopped with {} row(s) on screen", state.rows.len());
    state
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{AnnouncementSet, DepartureRecord, DepartureSnapshot};

    const PLACEHOLDER: &str = "Brak komunikatów";

    #[derive(Debug, PartialEq)]
    enum Event {
        Loading,
        Departures(Vec<RowOp>, String),
        Weather(serde_json::Value),
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
        ticks: usize,
    }

    impl DisplaySink for RecordingSink {
        fn show_loading(&mut self) {
            self.events.push(Event::Loading);
        }

        fn apply_departures(&mut self, ops: &[RowOp], announcement: &str, _: DateTime<Local>) {
            self.events
                .push(Event::Departures(ops.to_vec(), announcement.to_string()));
        }

        fn apply_weather(&mut self, payload: &WeatherPayload) {
            self.events.push(Event::Weather(payload.0.clone()));
        }

        fn tick(&mut self) {
            self.ticks += 1;
        }
    }

    fn publication(times: &[&str]) -> DeparturePublication {
        DeparturePublication {
            snapshot: DepartureSnapshot::new(
                times
                    .iter()
                    .map(|t| DepartureRecord::new("5", *t, "Dębiec"))
                    .collect(),
            ),
            announcements: AnnouncementSet::none(),
        }
    }

    #[tokio::test]
    async fn applies_publications_in_order() {
        let (dep_tx, dep_rx) = mpsc::channel(4);
        let (weather_tx, weather_rx) = mpsc::channel(4);

        dep_tx.send(publication(&["3 min"])).await.unwrap();
        dep_tx.send(publication(&["2 min", "9 min"])).await.unwrap();
        weather_tx.send(WeatherPayload(json!({"temperatura": "17.3"}))).await.unwrap();
        drop(dep_tx);
        drop(weather_tx);

        let mut sink = RecordingSink::default();
        let inputs = DisplayInputs {
            departures: dep_rx,
            weather: weather_rx,
        };
        let state = run_display(&mut sink, inputs, PLACEHOLDER, CancellationToken::new()).await;

        assert_eq!(sink.events[0], Event::Loading);
        let departures: Vec<&Event> = sink
            .events
            .iter()
            .filter(|e| matches!(e, Event::Departures(..)))
            .collect();
        assert_eq!(departures.len(), 2);
        assert_eq!(
            *departures[1],
            Event::Departures(
                vec![
                    RowOp::Update {
                        index: 0,
                        record: DepartureRecord::new("5", "2 min", "Dębiec")
                    },
                    RowOp::Append {
                        index: 1,
                        record: DepartureRecord::new("5", "9 min", "Dębiec")
                    },
                ],
                PLACEHOLDER.to_string()
            )
        );
        assert!(sink.events.contains(&Event::Weather(json!({"temperatura": "17.3"}))));
        assert_eq!(state.rows.len(), 2);
    }

    #[tokio::test]
    async fn loading_is_shown_once() {
        let (dep_tx, dep_rx) = mpsc::channel(4);
        let (weather_tx, weather_rx) = mpsc::channel(4);
        dep_tx.send(publication(&["3 min"])).await.unwrap();
        dep_tx.send(publication(&["3 min"])).await.unwrap();
        drop(dep_tx);
        drop(weather_tx);

        let mut sink = RecordingSink::default();
        let inputs = DisplayInputs {
            departures: dep_rx,
            weather: weather_rx,
        };
        run_display(&mut sink, inputs, PLACEHOLDER, CancellationToken::new()).await;

        let loading = sink.events.iter().filter(|e| **e == Event::Loading).count();
        assert_eq!(loading, 1);
        assert_eq!(
            sink.events.last(),
            Some(&Event::Departures(vec![], PLACEHOLDER.to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stays_loading_until_first_snapshot() {
        let (_dep_tx, dep_rx) = mpsc::channel::<DeparturePublication>(1);
        let (_weather_tx, weather_rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            canceller.cancel();
        });

        let mut sink = RecordingSink::default();
        let inputs = DisplayInputs {
            departures: dep_rx,
            weather: weather_rx,
        };
        let state = run_display(&mut sink, inputs, PLACEHOLDER, cancel).await;

        assert_eq!(sink.events, vec![Event::Loading]);
        assert!(sink.ticks >= 5);
        assert!(state.is_empty());
    }
}
