//! Service layer for the departure board.
//!
//! This module contains the business logic for:
//! - Board extraction (`Extractor`, `HtmlExtractor`)
//! - Announcement banner extraction (`AnnouncementExtractor`)
//! - Departure polling (`DeparturePoller`)
//! - Weather polling (`WeatherPoller`)
//! - Positional reconciliation (`reconcile`)
//! - The display task and its sinks (`run_display`, `TerminalSink`)

mod announcement;
mod departures;
pub mod display;
mod extractor;
pub mod reconciler;
mod terminal;
mod weather;

pub use announcement::AnnouncementExtractor;
pub use departures::{DeparturePoller, zip_records};
pub use display::{DisplayInputs, DisplaySink, run_display};
pub use extractor::{Extractor, FieldGroups, HtmlExtractor};
pub use reconciler::{DisplayState, RowOp, reconcile};
pub use terminal::TerminalSink;
pub use weather::{HttpWeatherSource, WeatherPoller, WeatherSource, decode_payload};
