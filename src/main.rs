//! CLI entry point for the stop price analyzer.
//!
//! Provides subcommands for fetching bus stops from the Google Places API,
//! analyzing a property dataset against a stops CSV, and running the whole
//! pipeline end to end.

mod infra;
mod services;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use stop_price_analyzer::{
    bands::BandConfig,
    engine::analyze,
    output::{self, AnalysisReport},
    properties::load_properties,
    stops::{self, BusStop},
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::infra::places::client::{GooglePlacesClient, PlacesConfig};
use crate::services::places_api::{PlacesApi, SearchArea};

#[derive(Parser)]
#[command(name = "stop_price_analyzer")]
#[command(about = "Average commercial property prices by distance band around bus stops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct BandArgs {
    /// Distance band boundaries in meters, ascending
    #[arg(short, long, value_delimiter = ',', default_value = "500,1000,2000")]
    bands: Vec<f64>,

    /// Add an unbounded final band beyond the last boundary
    #[arg(long, default_value_t = false)]
    open_ended: bool,
}

#[derive(clap::Args)]
struct AreaArgs {
    /// Search center latitude (defaults to Valladolid city center)
    #[arg(long, default_value_t = 41.652251)]
    center_lat: f64,

    /// Search center longitude
    #[arg(long, default_value_t = -4.724532)]
    center_lng: f64,

    /// Search radius in meters (max 50000)
    #[arg(short, long, default_value_t = 10_000)]
    radius: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a property dataset against bus stops from a CSV
    Analyze {
        /// Stops CSV (as written by fetch-stops)
        #[arg(short, long)]
        stops: String,

        /// Property dataset CSV
        #[arg(short, long, default_value = "idealista_data.csv")]
        dataset: String,

        #[command(flatten)]
        bands: BandArgs,

        /// CSV file to append result rows to
        #[arg(short, long, default_value = "results.csv")]
        output: String,

        /// Optional JSON report path
        #[arg(long)]
        report: Option<String>,
    },
    /// Fetch bus stops near a center point and save them as CSV
    FetchStops {
        #[command(flatten)]
        area: AreaArgs,

        /// CSV file to write stops to
        #[arg(short, long, default_value = "stops.csv")]
        output: String,
    },
    /// Fetch bus stops and analyze the dataset in one go
    Run {
        #[command(flatten)]
        area: AreaArgs,

        /// Property dataset CSV
        #[arg(short, long, default_value = "idealista_data.csv")]
        dataset: String,

        #[command(flatten)]
        bands: BandArgs,

        /// CSV file to append result rows to
        #[arg(short, long, default_value = "results.csv")]
        output: String,

        /// Optional JSON report path
        #[arg(long)]
        report: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/stop_price_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("stop_price_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            stops,
            dataset,
            bands,
            output,
            report,
        } => {
            let config = BandConfig::from_boundaries(&bands.bands, bands.open_ended)?;
            let stops = stops::load_stops(&stops)?;
            run_analysis(&stops, &dataset, &config, &output, report.as_deref())?;
        }
        Commands::FetchStops { area, output } => {
            let stops = fetch_stops(&area).await?;
            stops::save_stops(&output, &stops)?;
        }
        Commands::Run {
            area,
            dataset,
            bands,
            output,
            report,
        } => {
            // Validate the band configuration before spending API quota
            let config = BandConfig::from_boundaries(&bands.bands, bands.open_ended)?;
            let stops = fetch_stops(&area).await?;
            run_analysis(&stops, &dataset, &config, &output, report.as_deref())?;
        }
    }

    Ok(())
}

/// Queries the places API for bus stops within the search area.
#[tracing::instrument(skip(area), fields(center_lat = area.center_lat, center_lng = area.center_lng, radius = area.radius))]
async fn fetch_stops(area: &AreaArgs) -> Result<Vec<BusStop>> {
    let config = PlacesConfig::from_env()?;
    let client = GooglePlacesClient::new(config)?;

    let search = SearchArea {
        latitude: area.center_lat,
        longitude: area.center_lng,
        radius_m: area.radius,
    };
    let stops = client.nearby_bus_stops(&search).await?;

    info!(stop_count = stops.len(), "Bus stops fetched");
    Ok(stops)
}

/// Loads the dataset, runs the band aggregation, and writes the outputs.
#[tracing::instrument(skip(stops, config, report_path), fields(dataset_path, output_path))]
fn run_analysis(
    stops: &[BusStop],
    dataset_path: &str,
    config: &BandConfig,
    output_path: &str,
    report_path: Option<&str>,
) -> Result<()> {
    let properties = load_properties(dataset_path)?;

    let results = analyze(stops, &properties, config);

    let total_skipped: usize = results.iter().map(|r| r.skipped).sum();
    if total_skipped > 0 {
        info!(
            total_skipped,
            "Some records were excluded for invalid coordinates or missing prices"
        );
    }

    output::append_results(output_path, &results, config)?;

    let report = AnalysisReport::new(results, config, properties.len());
    match report_path {
        Some(path) => report.write(path)?,
        None => output::print_json(&report)?,
    }

    Ok(())
}
