//! Bus stop records and CSV persistence for offline runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// A bus stop with its location and the metadata the places API returns.
/// Coordinates are degrees; only `id`, `latitude` and `longitude` matter to
/// the analysis core, the rest passes through to reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusStop {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u64>,
}

/// Reads bus stops from a CSV previously written by [`save_stops`] (or any
/// CSV with matching headers).
pub fn load_stops(path: &str) -> Result<Vec<BusStop>> {
    let file = File::open(path).with_context(|| format!("failed to open stops CSV '{path}'"))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut stops = Vec::new();
    for result in rdr.deserialize() {
        let stop: BusStop = result?;
        stops.push(stop);
    }

    info!(path, stop_count = stops.len(), "Stops loaded");
    Ok(stops)
}

/// Writes bus stops to a CSV file, overwriting any existing content.
pub fn save_stops(path: &str, stops: &[BusStop]) -> Result<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for stop in stops {
        writer.serialize(stop)?;
    }
    writer.flush()?;

    info!(path, stop_count = stops.len(), "Stops written");
    Ok(())
}
