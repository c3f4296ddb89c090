// src/models/mod.rs

//! Domain models for the departure board.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod departure;
mod locators;

// Re-export all public types
pub use config::{
    ApiEndpoint, Config, DepartureConfig, DisplayConfig, HttpConfig, LoggingConfig, Stylesheet,
    WeatherConfig,
};
pub use departure::{AnnouncementSet, DeparturePublication, DepartureRecord, DepartureSnapshot};
pub use locators::{LocatorSet, parse_selector};

/// Decoded weather document, passed through to the display untouched.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct WeatherPayload(pub serde_json::Value);
