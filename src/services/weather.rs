// src/services/weather.rs

//! Weather poller.
//!
//! One GET per cycle; a decoded payload replaces the previous one as a
//! whole, so there is nothing to reconcile.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{Config, WeatherPayload};
use crate::utils::http;

/// Source of weather payloads.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> Result<WeatherPayload>;
}

/// [`WeatherSource`] that GETs a JSON endpoint.
pub struct HttpWeatherSource {
    client: reqwest::Client,
    url: String,
}

impl HttpWeatherSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn fetch(&self) -> Result<WeatherPayload> {
        let body = http::fetch_json_body(&self.client, &self.url).await?;
        decode_payload(&body)
    }
}

/// Decode a weather body without interpreting it.
pub fn decode_payload(body: &str) -> Result<WeatherPayload> {
    Ok(WeatherPayload(serde_json::from_str(body)?))
}

/// Fetches weather on a fixed cadence and forwards every good payload.
pub struct WeatherPoller {
    source: Arc<dyn WeatherSource>,
    interval: Duration,
}

impl WeatherPoller {
    pub fn new(config: &Config, source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            interval: config.weather.interval(),
        }
    }

    /// Run one cycle, sending the payload on success.
    ///
    /// Returns `false` once the receiver is gone.
    pub async fn poll_once(&self, tx: &mpsc::Sender<WeatherPayload>) -> bool {
        match self.source.fetch().await {
            Ok(payload) => tx.send(payload).await.is_ok(),
            Err(e) => {
                log::warn!("Weather cycle failed: {}", e);
                true
            }
        }
    }

    /// Poll until `cancel` fires or the receiving side goes away.
    pub async fn run(self, tx: mpsc::Sender<WeatherPayload>, cancel: CancellationToken) {
        log::info!("Weather poller started (interval {:?})", self.interval);

        while !cancel.is_cancelled() {
            let open = tokio::select! {
                _ = cancel.cancelled() => break,
                open = self.poll_once(&tx) => open,
            };
            if !open {
                log::info!("Display task closed; stopping weather poller");
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        log::info!("Weather poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::models::HttpConfig;
    use crate::utils::test_server;

    const SYNOP: &str = r#"{"id_stacji":"12330","stacja":"Poznań","data_pomiaru":"2024-05-01","godzina_pomiaru":"12","temperatura":"17.3","cisnienie":"1013.2"}"#;

    fn http_source(url: &str) -> HttpWeatherSource {
        let client = http::create_async_client(&HttpConfig::default()).unwrap();
        HttpWeatherSource::new(client, url)
    }

    fn poller(source: Arc<dyn WeatherSource>) -> WeatherPoller {
        WeatherPoller {
            source,
            interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(decode_payload("<html>maintenance</html>").is_err());
    }

    #[tokio::test]
    async fn ok_response_passes_through_unchanged() {
        let url = test_server::serve(200, "application/json", SYNOP).await;
        let (tx, mut rx) = mpsc::channel(1);

        assert!(poller(Arc::new(http_source(&url))).poll_once(&tx).await);

        let payload = rx.recv().await.unwrap();
        let expected: serde_json::Value = serde_json::from_str(SYNOP).unwrap();
        assert_eq!(payload.0, expected);
        assert_eq!(payload.0["stacja"], json!("Poznań"));
        assert_eq!(serde_json::to_value(&payload).unwrap(), expected);
    }

    #[tokio::test]
    async fn non_200_sends_nothing() {
        let url = test_server::serve(503, "application/json", SYNOP).await;
        let (tx, mut rx) = mpsc::channel(1);

        assert!(poller(Arc::new(http_source(&url))).poll_once(&tx).await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn undecodable_body_sends_nothing() {
        let url = test_server::serve(200, "application/json", "{truncated").await;
        let (tx, mut rx) = mpsc::channel(1);

        assert!(poller(Arc::new(http_source(&url))).poll_once(&tx).await);
        assert!(rx.try_recv().is_err());
    }

    /// Fails every other call.
    struct FlakySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherSource for FlakySource {
        async fn fetch(&self) -> Result<WeatherPayload> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 0 {
                Err(crate::error::AppError::Status {
                    url: "http://weather.test/".into(),
                    status: 500,
                })
            } else {
                Ok(WeatherPayload(json!({ "call": n })))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_skips_failed_cycles() {
        let source = Arc::new(FlakySource {
            calls: AtomicUsize::new(0),
        });
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poller(source).run(tx, cancel.clone()));

        assert_eq!(rx.recv().await.unwrap().0, json!({ "call": 1 }));
        assert_eq!(rx.recv().await.unwrap().0, json!({ "call": 3 }));

        cancel.cancel();
        handle.await.unwrap();
    }
}
