//! Plain terminal rendering of the board.

use std::io::Write;

use chrono::{DateTime, Local};

use crate::models::{DepartureRecord, DisplayConfig, WeatherPayload};
use crate::services::display::DisplaySink;
use crate::services::reconciler::RowOp;

const DOTS: [&str; 4] = ["", ".", "..", "..."];

/// Weather fields shown on the board, with their labels.
const WEATHER_FIELDS: [(&str, &str, &str); 5] = [
    ("temperatura", "Temperatura", "°C"),
    ("kierunek_wiatru", "Kierunek wiatru", "°"),
    ("wilgotnosc_wzgledna", "Wilgotność względna", "%"),
    ("suma_opadu", "Suma opadu", " mm"),
    ("cisnienie", "Ciśnienie", " hPa"),
];

/// [`DisplaySink`] that redraws the whole board to a writer.
pub struct TerminalSink<W: Write + Send> {
    out: W,
    texts: DisplayConfig,
    clear_screen: bool,
    rows: Vec<DepartureRecord>,
    announcement: String,
    weather: Option<WeatherPayload>,
    updated_at: Option<DateTime<Local>>,
    dots: usize,
    /// ANSI prefix derived from the configured stylesheet
    style: String,
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(out: W, texts: DisplayConfig) -> Self {
        Self {
            out,
            texts,
            clear_screen: false,
            rows: Vec::new(),
            announcement: String::new(),
            weather: None,
            updated_at: None,
            dots: 0,
            style: String::new(),
        }
    }

    /// Colour the board from a CSS declaration list.
    ///
    /// Only `color` and `background-color` with hex values are understood;
    /// other declarations have no terminal counterpart and are skipped.
    pub fn styled(mut self, css: &str) -> Self {
        self.style = ansi_style(css);
        self
    }

    /// Clear the terminal before every redraw.
    pub fn clearing(mut self) -> Self {
        self.clear_screen = true;
        self
    }

    pub fn rows(&self) -> &[DepartureRecord] {
        &self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn loading(&self) -> bool {
        self.updated_at.is_none()
    }

    fn apply(&mut self, op: &RowOp) {
        let index = op.index();
        let record = op.record().clone();
        if index < self.rows.len() {
            self.rows[index] = record;
        } else if index == self.rows.len() {
            self.rows.push(record);
        } else {
            log::warn!(
                "Skipping row op at {} past the end of a {}-row board",
                index,
                self.rows.len()
            );
        }
    }

    fn render(&mut self) {
        let mut frame = String::new();
        if self.clear_screen {
            frame.push_str("\x1b[2J\x1b[H");
        }
        frame.push_str(&self.style);

        if self.loading() {
            frame.push_str(&format!("{}\n{}\n", self.texts.loading_text, DOTS[self.dots]));
        } else {
            frame.push_str(&self.announcement);
            frame.push_str("\n\n");
            for row in &self.rows {
                frame.push_str(&row.format(&self.texts.row_template));
                frame.push('\n');
            }
            if let Some(weather) = &self.weather {
                frame.push('\n');
                frame.push_str(&weather_summary(weather));
            }
            if let Some(at) = self.updated_at {
                frame.push_str(&format!("\nAktualizacja: {}\n", at.format("%H:%M:%S")));
            }
            frame.push_str(&self.texts.footer);
            frame.push('\n');
        }
        if !self.style.is_empty() {
            frame.push_str("\x1b[0m");
        }

        if let Err(e) = self.out.write_all(frame.as_bytes()).and_then(|_| self.out.flush()) {
            log::warn!("Failed to draw board: {}", e);
        }
    }
}

impl<W: Write + Send> DisplaySink for TerminalSink<W> {
    fn show_loading(&mut self) {
        self.dots = 0;
        self.render();
    }

    fn apply_departures(
        &mut self,
        ops: &[RowOp],
        announcement: &str,
        fetched_at: DateTime<Local>,
    ) {
        for op in ops {
            self.apply(op);
        }
        self.announcement = announcement.to_string();
        self.updated_at = Some(fetched_at);
        self.render();
    }

    fn apply_weather(&mut self, payload: &WeatherPayload) {
        self.weather = Some(payload.clone());
        if !self.loading() {
            self.render();
        }
    }

    fn tick(&mut self) {
        if self.loading() {
            self.dots = (self.dots + 1) % DOTS.len();
            self.render();
        }
    }
}

/// Translate `color` / `background-color` declarations into SGR codes.
fn ansi_style(css: &str) -> String {
    let mut codes = String::new();
    for declaration in css.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let layer = match property.trim() {
            "color" => 38,
            "background-color" => 48,
            _ => continue,
        };
        match hex_rgb(value.trim()) {
            Some((r, g, b)) => codes.push_str(&format!("\x1b[{layer};2;{r};{g};{b}m")),
            None => log::debug!("Ignoring {} value '{}'", property.trim(), value.trim()),
        }
    }
    codes
}

/// Parse `#rgb` or `#rrggbb`.
fn hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
            Some((short(0)?, short(1)?, short(2)?))
        }
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

/// Human-readable lines for the known synoptic fields.
///
/// Payloads without any known field are shown as compact JSON.
fn weather_summary(payload: &WeatherPayload) -> String {
    let field = |name: &str| -> Option<String> {
        match payload.0.get(name)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };

    let mut lines = Vec::new();
    if let (Some(date), Some(hour)) = (field("data_pomiaru"), field("godzina_pomiaru")) {
        lines.push(format!("Pomiar: {date}, {hour}:00"));
    }
    for (key, label, unit) in WEATHER_FIELDS {
        if let Some(value) = field(key) {
            lines.push(format!("{label}: {value}{unit}"));
        }
    }

    if lines.is_empty() {
        return format!("{}\n", payload.0);
    }
    lines.join("\n") + "\n"
}
