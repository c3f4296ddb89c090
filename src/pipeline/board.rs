// src/pipeline/board.rs

//! Live board pipeline: pollers feeding the display task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{Config, DeparturePublication, WeatherPayload};
use crate::services::{
    DeparturePoller, DisplayInputs, DisplaySink, DisplayState, Extractor, WeatherPoller,
    WeatherSource, run_display,
};

/// Run the departure and weather pollers against `sink` until `cancel`.
///
/// Each poller runs as its own task; the display task runs on the caller's
/// task and is the only writer of the display state, which is returned
/// once everything has stopped.
pub async fn run_board<S: DisplaySink>(
    config: Arc<Config>,
    extractor: Arc<dyn Extractor>,
    weather: Arc<dyn WeatherSource>,
    sink: &mut S,
    cancel: CancellationToken,
) -> Result<DisplayState> {
    let departures = DeparturePoller::new(&config, extractor)?;
    let weather = WeatherPoller::new(&config, weather);

    let (departure_tx, departure_rx) =
        mpsc::channel::<DeparturePublication>(config.departures.channel_capacity);
    let (weather_tx, weather_rx) = mpsc::channel::<WeatherPayload>(1);

    log::info!("Starting board for {}", config.departures_url()?);

    let departure_task = tokio::spawn(departures.run(departure_tx, cancel.child_token()));
    let weather_task = tokio::spawn(weather.run(weather_tx, cancel.child_token()));

    let inputs = DisplayInputs {
        departures: departure_rx,
        weather: weather_rx,
    };
    let placeholder = &config.display.no_announcements;
    let state = run_display(sink, inputs, placeholder, cancel.clone()).await;

    // The display may also stop because both pollers died; make sure
    // neither outlives it.
    cancel.cancel();
    for (name, task) in [("departure", departure_task), ("weather", weather_task)] {
        if let Err(e) = task.await {
            log::error!("{} poller task failed: {}", name, e);
        }
    }

    Ok(state)
}

/// Run a single departure cycle.
pub async fn run_once(
    config: &Config,
    extractor: Arc<dyn Extractor>,
) -> Result<DeparturePublication> {
    DeparturePoller::new(config, extractor)?.poll_once().await
}

/// Fetch the weather once.
pub async fn fetch_weather(weather: &dyn WeatherSource) -> Result<WeatherPayload> {
    weather.fetch().await
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Local};
    use serde_json::json;

    use super::*;
    use crate::error::AppError;
    use crate::models::{DepartureRecord, LocatorSet};
    use crate::services::{FieldGroups, RowOp};

    struct Script(Mutex<VecDeque<Result<FieldGroups>>>);

    #[async_trait]
    impl Extractor for Script {
        async fn extract(
            &self,
            _: &str,
            _: &LocatorSet,
            timeout: Duration,
        ) -> Result<FieldGroups> {
            let next = self.0.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Err(AppError::timeout(".line", timeout)))
        }
    }

    struct FixedWeather;

    #[async_trait]
    impl WeatherSource for FixedWeather {
        async fn fetch(&self) -> Result<WeatherPayload> {
            Ok(WeatherPayload(json!({"temperatura": "12.0"})))
        }
    }

    #[derive(Default)]
    struct CountingSink {
        departure_updates: usize,
        weather_updates: usize,
    }

    impl DisplaySink for CountingSink {
        fn show_loading(&mut self) {}

        fn apply_departures(&mut self, _: &[RowOp], _: &str, _: DateTime<Local>) {
            self.departure_updates += 1;
        }

        fn apply_weather(&mut self, _: &WeatherPayload) {
            self.weather_updates += 1;
        }
    }

    fn config() -> Arc<Config> {
        let mut config = Config::from_toml(
            r#"
            [[api]]
            url = "http://board.test/"
            [[api]]
            url = "http://weather.test/"
            "#,
        )
        .unwrap();
        config.departures.interval_ms = 10;
        Arc::new(config)
    }

    fn board(times: &[&str]) -> FieldGroups {
        FieldGroups {
            lines: times.iter().map(|_| "5".to_string()).collect(),
            times: times.iter().map(|t| t.to_string()).collect(),
            directions: times.iter().map(|_| "Dębiec".to_string()).collect(),
            document: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycles_leave_display_state_untouched() {
        let extractor = Arc::new(Script(Mutex::new(VecDeque::from(vec![
            Ok(board(&["3 min", "8 min"])),
            Err(AppError::timeout(".line", Duration::from_secs(10))),
            Err(AppError::navigation("http://board.test/", "connection reset")),
        ]))));
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let mut sink = CountingSink::default();
        let state = run_board(config(), extractor, Arc::new(FixedWeather), &mut sink, cancel)
            .await
            .unwrap();

        assert_eq!(sink.departure_updates, 1);
        assert_eq!(sink.weather_updates, 1);
        assert_eq!(
            state.rows,
            vec![
                DepartureRecord::new("5", "3 min", "Dębiec"),
                DepartureRecord::new("5", "8 min", "Dębiec"),
            ]
        );
        assert_eq!(state.announcement, "Brak komunikatów");
    }

    #[tokio::test]
    async fn run_once_returns_single_publication() {
        let extractor = Arc::new(Script(Mutex::new(VecDeque::from(vec![Ok(board(&[
            "3 min",
        ]))]))));
        let publication = run_once(&config(), extractor).await.unwrap();
        assert_eq!(publication.snapshot.len(), 1);
    }

    #[tokio::test]
    async fn run_once_surfaces_cycle_error() {
        let extractor = Arc::new(Script(Mutex::new(VecDeque::new())));
        let err = run_once(&config(), extractor).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
