// src/services/extractor.rs

//! Extractor adapter.
//!
//! Loads the departure board document and pulls the text of every element
//! matched by the mandatory locators. The board is rendered server side but
//! may come back half-filled while the upstream feed is catching up, so the
//! document is reloaded until every mandatory locator reaches
//! `min_expected` matches or the wait window closes.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{LocatorSet, parse_selector};
use crate::utils::{http, normalize_whitespace};

/// Element texts from one document load, grouped by locator.
#[derive(Debug, Clone, Default)]
pub struct FieldGroups {
    pub lines: Vec<String>,
    pub times: Vec<String>,
    pub directions: Vec<String>,

    /// Raw document the groups were taken from
    pub document: String,
}

/// Capability to load a document and query it by locator.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Load `url` and return the mandatory field groups.
    ///
    /// Fails with `Timeout` when some mandatory locator is still short of
    /// `min_expected` matches after `timeout`.
    async fn extract(
        &self,
        url: &str,
        locators: &LocatorSet,
        timeout: Duration,
    ) -> Result<FieldGroups>;
}

/// Outcome of scanning one loaded document.
#[derive(Debug)]
enum Scan {
    Ready {
        lines: Vec<String>,
        times: Vec<String>,
        directions: Vec<String>,
    },
    /// The named locator has too few matches yet
    Missing(String),
}

/// [`Extractor`] backed by reqwest and scraper.
pub struct HtmlExtractor {
    client: reqwest::Client,
    retry_interval: Duration,
}

impl HtmlExtractor {
    pub fn new(client: reqwest::Client, retry_interval: Duration) -> Self {
        Self {
            client,
            retry_interval,
        }
    }

    /// Match all mandatory locators against one document.
    ///
    /// Only the first `min(len)` elements of each group become records, so
    /// empty text past that prefix is dropped along with the rest of the
    /// unmatched tail.
    fn scan(document: &str, locators: &LocatorSet) -> Result<Scan> {
        let html = Html::parse_document(document);
        let mandatory = locators.mandatory();
        let mut groups: Vec<Vec<String>> = Vec::with_capacity(mandatory.len());

        for (_, selector_str) in mandatory {
            let selector = parse_selector(selector_str)?;
            let texts: Vec<String> = html
                .select(&selector)
                .map(|el| normalize_whitespace(&el.text().collect::<String>()))
                .collect();

            if texts.len() < locators.min_expected {
                return Ok(Scan::Missing(selector_str.to_string()));
            }
            groups.push(texts);
        }

        let paired = groups.iter().map(Vec::len).min().unwrap_or(0);
        for ((name, selector_str), texts) in mandatory.iter().zip(&groups) {
            if let Some(position) = texts[..paired].iter().position(String::is_empty) {
                return Err(AppError::structural(
                    *selector_str,
                    format!("{name} element #{position} has no text"),
                ));
            }
        }

        let directions = groups.pop().unwrap_or_default();
        let times = groups.pop().unwrap_or_default();
        let lines = groups.pop().unwrap_or_default();
        Ok(Scan::Ready {
            lines,
            times,
            directions,
        })
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    async fn extract(
        &self,
        url: &str,
        locators: &LocatorSet,
        timeout: Duration,
    ) -> Result<FieldGroups> {
        let deadline = Instant::now() + timeout;
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let document =
                match tokio::time::timeout(remaining, http::fetch_document(&self.client, url))
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => return Err(AppError::timeout("document load", timeout)),
                };

            match Self::scan(&document, locators)? {
                Scan::Ready {
                    lines,
                    times,
                    directions,
                } => {
                    log::debug!(
                        "Board matched on attempt {}: {} lines, {} times, {} directions",
                        attempt,
                        lines.len(),
                        times.len(),
                        directions.len()
                    );
                    return Ok(FieldGroups {
                        lines,
                        times,
                        directions,
                        document,
                    });
                }
                Scan::Missing(locator) => {
                    if Instant::now() + self.retry_interval >= deadline {
                        return Err(AppError::timeout(locator, timeout));
                    }
                    log::debug!("'{}' not ready (attempt {}), reloading", locator, attempt);
                    tokio::time::sleep(self.retry_interval).await;
                }
            }
        }
    }
}
