//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::LocatorSet;

/// Root application configuration.
///
/// Loaded once at startup and shared read-only between the pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote endpoints: departures page first, weather feed second
    #[serde(rename = "API", alias = "api")]
    pub api: Vec<ApiEndpoint>,

    /// Display stylesheets; the terminal board takes its colours from the first
    #[serde(default)]
    pub stylesheet: Vec<Stylesheet>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Departure polling behavior
    #[serde(default)]
    pub departures: DepartureConfig,

    /// CSS locators for the departure board
    #[serde(default)]
    pub locators: LocatorSet,

    /// Weather polling behavior
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Display texts
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML or JSON file.
    ///
    /// Files ending in `.json` use the JSON layout, anything else is TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        };
        parsed.map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load and validate in one step. Any failure is fatal at startup.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// URL of the departure board page.
    pub fn departures_url(&self) -> Result<&str> {
        self.endpoint(0, "departures")
    }

    /// URL of the weather feed.
    pub fn weather_url(&self) -> Result<&str> {
        self.endpoint(1, "weather")
    }

    /// First stylesheet, if any.
    pub fn style(&self) -> Option<&str> {
        self.stylesheet.first().map(|s| s.style.as_str())
    }

    fn endpoint(&self, index: usize, name: &str) -> Result<&str> {
        self.api
            .get(index)
            .map(|e| e.url.as_str())
            .ok_or_else(|| AppError::config(format!("API[{index}] ({name}) is missing")))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.len() < 2 {
            return Err(AppError::config(
                "API must list the departures page and the weather endpoint",
            ));
        }
        for (index, endpoint) in self.api.iter().enumerate() {
            Url::parse(&endpoint.url).map_err(|e| {
                AppError::config(format!("API[{index}] url '{}': {e}", endpoint.url))
            })?;
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.departures.timeout_secs == 0 {
            return Err(AppError::config("departures.timeout_secs must be > 0"));
        }
        if self.departures.interval_ms == 0 {
            return Err(AppError::config("departures.interval_ms must be > 0"));
        }
        if self.departures.channel_capacity == 0 {
            return Err(AppError::config("departures.channel_capacity must be > 0"));
        }
        if self.weather.interval_secs == 0 {
            return Err(AppError::config("weather.interval_secs must be > 0"));
        }
        self.locators.validate()?;
        Ok(())
    }
}

/// A named remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoint {
    /// Optional label, for logs only
    #[serde(default)]
    pub name: Option<String>,

    /// Absolute URL
    pub url: String,
}

/// Stylesheet entry for the display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stylesheet {
    pub style: String,
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::http_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::http_timeout(),
        }
    }
}

/// Departure polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartureConfig {
    /// Maximum wait for the board elements in one cycle
    #[serde(default = "defaults::departure_timeout")]
    pub timeout_secs: u64,

    /// Delay between the end of one cycle and the start of the next
    #[serde(default = "defaults::departure_interval")]
    pub interval_ms: u64,

    /// Delay between document reloads while waiting for elements
    #[serde(default = "defaults::retry_interval")]
    pub retry_interval_ms: u64,

    /// Capacity of the handoff queue to the display task
    #[serde(default = "defaults::channel_capacity")]
    pub channel_capacity: usize,
}

impl DepartureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for DepartureConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::departure_timeout(),
            interval_ms: defaults::departure_interval(),
            retry_interval_ms: defaults::retry_interval(),
            channel_capacity: defaults::channel_capacity(),
        }
    }
}

/// Weather polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "defaults::weather_interval")]
    pub interval_secs: u64,
}

impl WeatherConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::weather_interval(),
        }
    }
}

/// Texts shown by the display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Row template with `{line}`, `{time}` and `{direction}` placeholders
    #[serde(default = "defaults::row_template")]
    pub row_template: String,

    /// Shown in place of the banner when no announcement is published
    #[serde(default = "defaults::no_announcements")]
    pub no_announcements: String,

    /// Shown until the first departure snapshot arrives
    #[serde(default = "defaults::loading_text")]
    pub loading_text: String,

    #[serde(default = "defaults::footer")]
    pub footer: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            row_template: defaults::row_template(),
            no_announcements: defaults::no_announcements(),
            loading_text: defaults::loading_text(),
            footer: defaults::footer(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tramboard/0.1)".into()
    }
    pub fn http_timeout() -> u64 {
        10
    }

    pub fn departure_timeout() -> u64 {
        10
    }
    pub fn departure_interval() -> u64 {
        1000
    }
    pub fn retry_interval() -> u64 {
        500
    }
    pub fn channel_capacity() -> usize {
        16
    }

    pub fn weather_interval() -> u64 {
        60
    }

    pub fn row_template() -> String {
        "Tramwaj: {line}, Odjazd: {time}, Kierunek: {direction}".into()
    }
    pub fn no_announcements() -> String {
        "Brak komunikatów".into()
    }
    pub fn loading_text() -> String {
        "Ładowanie danych".into()
    }
    pub fn footer() -> String {
        "© 2024 DoDomuDojadę.".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
