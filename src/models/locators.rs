// src/models/locators.rs

//! CSS locators for scraping a departure board.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS locators for the departure board, one per field class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorSet {
    /// Selector for the line identifiers
    #[serde(default = "defaults::line")]
    pub line: String,

    /// Selector for the departure times
    #[serde(default = "defaults::time")]
    pub time: String,

    /// Selector for the directions
    #[serde(default = "defaults::direction")]
    pub direction: String,

    /// Selector for the announcement banner container (optional content)
    #[serde(default = "defaults::announcement_container")]
    pub announcement_container: String,

    /// Selector for the link inside the announcement container
    #[serde(default = "defaults::announcement_link")]
    pub announcement_link: String,

    /// Minimum element count each mandatory locator must reach
    #[serde(default = "defaults::min_expected")]
    pub min_expected: usize,
}

impl Default for LocatorSet {
    fn default() -> Self {
        Self {
            line: defaults::line(),
            time: defaults::time(),
            direction: defaults::direction(),
            announcement_container: defaults::announcement_container(),
            announcement_link: defaults::announcement_link(),
            min_expected: defaults::min_expected(),
        }
    }
}

impl LocatorSet {
    /// The mandatory locators as `(name, selector)` pairs, in zip order.
    pub fn mandatory(&self) -> [(&'static str, &str); 3] {
        [
            ("line", self.line.as_str()),
            ("time", self.time.as_str()),
            ("direction", self.direction.as_str()),
        ]
    }

    /// Check that every selector parses.
    pub fn validate(&self) -> Result<()> {
        for (_, selector) in self.mandatory() {
            parse_selector(selector)?;
        }
        parse_selector(&self.announcement_container)?;
        parse_selector(&self.announcement_link)?;
        if self.min_expected == 0 {
            return Err(AppError::config("locators.min_expected must be > 0"));
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn line() -> String {
        ".line".into()
    }
    pub fn time() -> String {
        ".time".into()
    }
    pub fn direction() -> String {
        "div.direction".into()
    }
    pub fn announcement_container() -> String {
        ".messages_in".into()
    }
    pub fn announcement_link() -> String {
        "a".into()
    }
    pub fn min_expected() -> usize {
        1
    }
}
