//! tramboard CLI
//!
//! Runs the live departure board in the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tramboard::{
    error::Result,
    models::Config,
    pipeline,
    services::{HtmlExtractor, HttpWeatherSource, TerminalSink},
    utils::http,
};

/// tramboard - live tram departures and weather
#[derive(Parser, Debug)]
#[command(name = "tramboard", version, about = "Live tram departure board")]
struct Cli {
    /// Path to the configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "board.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll departures and weather and keep the board on screen (default)
    Run {
        /// Do not clear the terminal between redraws
        #[arg(long)]
        no_clear: bool,
    },

    /// Run a single departure cycle and print the board
    Once,

    /// Fetch the weather once and print it as JSON
    Weather,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing or malformed configuration is fatal.
    let config = match Config::load_validated(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, "info");
            log::error!("Cannot start with {}: {}", cli.config.display(), e);
            return Err(e);
        }
    };
    init_logging(cli.verbose, &config.logging.level);
    log::info!("Loaded configuration from {}", cli.config.display());

    let config = Arc::new(config);
    let client = http::create_async_client(&config.http)?;
    let extractor = Arc::new(HtmlExtractor::new(
        client.clone(),
        config.departures.retry_interval(),
    ));
    let weather = Arc::new(HttpWeatherSource::new(client, config.weather_url()?));

    match cli.command.unwrap_or(Command::Run { no_clear: false }) {
        Command::Run { no_clear } => {
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupt received, shutting down...");
                }
                on_signal.cancel();
            });

            let mut sink = TerminalSink::new(std::io::stdout(), config.display.clone());
            if !no_clear {
                sink = sink.clearing();
            }
            if let Some(style) = config.style() {
                sink = sink.styled(style);
            }

            let state =
                pipeline::run_board(Arc::clone(&config), extractor, weather, &mut sink, cancel)
                    .await?;
            log::info!("Board stopped with {} row(s) displayed", state.rows.len());
        }

        Command::Once => {
            let publication = match pipeline::run_once(&config, extractor).await {
                Ok(publication) => publication,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Departure board unavailable right now: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    log::error!("Departure cycle cannot run: {}", e);
                    return Err(e);
                }
            };
            let announcement = if publication.announcements.is_empty() {
                config.display.no_announcements.clone()
            } else {
                publication.announcements.joined()
            };

            println!("{announcement}");
            for record in &publication.snapshot.records {
                println!("{}", record.format(&config.display.row_template));
            }
            log::info!(
                "Fetched {} departures at {}",
                publication.snapshot.len(),
                publication.snapshot.fetched_at.format("%H:%M:%S")
            );
        }

        Command::Weather => {
            let payload = pipeline::fetch_weather(weather.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("Departures: {}", config.departures_url()?);
            log::info!("Weather: {}", config.weather_url()?);
            match config.style() {
                Some(style) => log::info!("Stylesheet: {} chars", style.len()),
                None => log::info!("Stylesheet: none"),
            }
        }
    }

    Ok(())
}
