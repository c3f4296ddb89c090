//! Pipeline entry points for board operations.
//!
//! - `run_board`: Poll departures and weather into a display until cancelled
//! - `run_once`: Run a single departure cycle
//! - `fetch_weather`: Fetch the weather once

pub mod board;

pub use board::{fetch_weather, run_board, run_once};
