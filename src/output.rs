//! Output shaping and persistence for analysis results.
//!
//! The flat CSV carries one row per stop with `id, latitude, longitude`
//! followed by a mean and a count column per configured band, in band order.
//! Bands with no data leave the mean cell empty rather than writing a zero.
//! The JSON report keeps the richer per-stop detail (names, per-m² means,
//! diagnostic counters).

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::bands::BandConfig;
use crate::engine::StopAnalysis;

/// Column names for the flat CSV, derived solely from the band configuration:
/// adding or removing a band changes the output shape, nothing else does.
pub fn header(config: &BandConfig) -> Vec<String> {
    let mut columns = vec![
        "id".to_string(),
        "latitude".to_string(),
        "longitude".to_string(),
    ];
    for i in 0..config.len() {
        columns.push(format!("band_{i}_mean"));
        columns.push(format!("band_{i}_count"));
    }
    columns
}

/// Flattens one stop's analysis into CSV fields matching [`header`]. A `None`
/// mean becomes an empty field.
pub fn to_row(analysis: &StopAnalysis) -> Vec<String> {
    let mut fields = vec![
        analysis.id.clone(),
        analysis.latitude.to_string(),
        analysis.longitude.to_string(),
    ];
    for band in &analysis.bands {
        fields.push(band.mean_price.map(|m| m.to_string()).unwrap_or_default());
        fields.push(band.count.to_string());
    }
    fields
}

/// Appends one row per stop to a CSV file, writing the header only when the
/// file does not exist yet.
pub fn append_results(path: &str, results: &[StopAnalysis], config: &BandConfig) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending result rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = WriterBuilder::new().from_writer(file);

    if !file_exists {
        writer.write_record(header(config))?;
    }
    for analysis in results {
        writer.write_record(to_row(analysis))?;
    }
    writer.flush()?;

    info!(path, row_count = results.len(), "Results written");
    Ok(())
}

/// Full analysis report serialized as JSON: band labels, totals, and per-stop
/// detail the flat CSV omits.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub band_labels: Vec<String>,
    pub stop_count: usize,
    pub record_count: usize,
    pub stops: Vec<StopAnalysis>,
}

impl AnalysisReport {
    pub fn new(results: Vec<StopAnalysis>, config: &BandConfig, record_count: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            band_labels: config.bands().iter().map(|b| b.label()).collect(),
            stop_count: results.len(),
            record_count,
            stops: results,
        }
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write(&self, path: &str) -> Result<()> {
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        info!(path, "Report written");
        Ok(())
    }
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &AnalysisReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::BandStatistics;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn two_band_config() -> BandConfig {
        BandConfig::from_boundaries(&[500.0, 1000.0], false).unwrap()
    }

    fn sample_analysis() -> StopAnalysis {
        StopAnalysis {
            id: "stop-1".to_string(),
            name: "Plaza Mayor".to_string(),
            latitude: 41.6529,
            longitude: -4.7286,
            bands: vec![
                BandStatistics {
                    count: 2,
                    mean_price: Some(150_000.0),
                    mean_price_per_area: Some(1_800.0),
                },
                BandStatistics {
                    count: 0,
                    mean_price: None,
                    mean_price_per_area: None,
                },
            ],
            skipped: 1,
            unassigned: 0,
        }
    }

    #[test]
    fn test_header_follows_band_config() {
        let columns = header(&two_band_config());
        assert_eq!(
            columns,
            vec![
                "id",
                "latitude",
                "longitude",
                "band_0_mean",
                "band_0_count",
                "band_1_mean",
                "band_1_count"
            ]
        );
    }

    #[test]
    fn test_no_data_band_serializes_as_empty_not_zero() {
        let fields = to_row(&sample_analysis());
        assert_eq!(fields[3], "150000");
        assert_eq!(fields[4], "2");
        // Band 1 has no data: empty mean, zero count
        assert_eq!(fields[5], "");
        assert_eq!(fields[6], "0");
    }

    #[test]
    fn test_append_results_writes_header_once() {
        let path = temp_path("stop_price_analyzer_test_header.csv");
        let _ = fs::remove_file(&path);

        let config = two_band_config();
        append_results(&path, &[sample_analysis()], &config).unwrap();
        append_results(&path, &[sample_analysis()], &config).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("id,latitude"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let config = two_band_config();
        let report = AnalysisReport::new(vec![sample_analysis()], &config, 3);

        assert_eq!(report.band_labels, vec!["0-500m", "500-1000m"]);
        assert_eq!(report.stop_count, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stops"][0]["bands"][1]["mean_price"], serde_json::Value::Null);
        assert_eq!(json["record_count"], 3);
    }
}
