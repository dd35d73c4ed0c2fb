//! Property dataset loader.
//!
//! The dataset is a CSV export of commercial listings with at least
//! `latitude`, `longitude`, `price`, `size`, `floor`, `rooms`, `bathrooms`,
//! `priceByArea` and `url` columns. Rows that fail to deserialize are skipped
//! with a warning; missing coordinates or price survive loading as `None` so
//! the analysis engine can count them in its skip diagnostics.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::geo::validate_coordinate;

/// One commercial property listing. Fields beyond price and coordinates play
/// no role in band classification and pass through to reports untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Option<f64>,
    pub size: Option<f64>,
    pub floor: Option<String>,
    pub rooms: Option<i64>,
    pub bathrooms: Option<i64>,
    #[serde(rename = "priceByArea")]
    pub price_per_area: Option<f64>,
    pub url: Option<String>,
}

impl Property {
    /// Returns `(latitude, longitude, price)` when the record can take part
    /// in aggregation.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidCoordinate`] when a coordinate is absent or out
    /// of range, [`AnalysisError::MissingPrice`] when the price is absent.
    /// Both are record-level conditions the engine recovers from by skipping.
    pub fn validated(&self) -> Result<(f64, f64, f64), AnalysisError> {
        let latitude = self.latitude.unwrap_or(f64::NAN);
        let longitude = self.longitude.unwrap_or(f64::NAN);
        validate_coordinate(latitude, longitude)?;

        let price = self.price.ok_or(AnalysisError::MissingPrice)?;
        Ok((latitude, longitude, price))
    }
}

const REQUIRED_COLUMNS: &[&str] = &[
    "latitude",
    "longitude",
    "price",
    "size",
    "floor",
    "rooms",
    "bathrooms",
    "priceByArea",
    "url",
];

/// Parses property records from CSV bytes or any other reader.
///
/// # Errors
///
/// Fails when required columns are absent from the header or when no row at
/// all could be parsed.
pub fn parse_properties<R: Read>(reader: R) -> Result<Vec<Property>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("property CSV is missing required columns: {missing:?}");
    }

    let mut properties = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        match result {
            Ok(property) => properties.push(property),
            Err(e) => {
                warn!(row, error = %e, "Skipping malformed property row");
            }
        }
    }

    if properties.is_empty() {
        bail!("no property records could be loaded");
    }

    Ok(properties)
}

/// Loads the property dataset from a CSV file on disk.
pub fn load_properties(path: &str) -> Result<Vec<Property>> {
    let file =
        File::open(path).with_context(|| format!("failed to open property CSV '{path}'"))?;
    let properties = parse_properties(file)?;

    info!(path, record_count = properties.len(), "Property dataset loaded");
    Ok(properties)
}
