//! The analysis core: classify every property into a distance band around
//! every bus stop and accumulate per-band price statistics.

use serde::Serialize;
use tracing::debug;

use crate::bands::BandConfig;
use crate::geo::haversine_distance;
use crate::properties::Property;
use crate::stats::{Aggregator, BandStatistics};
use crate::stops::BusStop;

/// Per-stop analysis outcome: one [`BandStatistics`] per configured band plus
/// the diagnostic counters. For every stop,
/// `bands' counts + unassigned + skipped == total records`.
#[derive(Debug, Clone, Serialize)]
pub struct StopAnalysis {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bands: Vec<BandStatistics>,
    /// Records excluded for invalid coordinates or missing price.
    pub skipped: usize,
    /// Valid records whose distance fell outside every configured band.
    pub unassigned: usize,
}

/// Runs the full aggregation: for each stop, every property is measured,
/// classified and accumulated exactly once. O(|stops| × |properties|), which
/// is fine at the expected scale of tens of stops and low thousands of
/// records.
///
/// Record-level problems (bad coordinates, missing price) never abort the
/// run; they increment the stop's skip counter. A stop whose every record was
/// skipped still yields a result with all bands reporting no data.
pub fn analyze(stops: &[BusStop], properties: &[Property], config: &BandConfig) -> Vec<StopAnalysis> {
    stops
        .iter()
        .map(|stop| analyze_stop(stop, properties, config))
        .collect()
}

fn analyze_stop(stop: &BusStop, properties: &[Property], config: &BandConfig) -> StopAnalysis {
    let mut aggregator = Aggregator::new(config);

    for property in properties {
        let (lat, lon, price) = match property.validated() {
            Ok(fields) => fields,
            Err(_) => {
                aggregator.record_skipped();
                continue;
            }
        };

        let distance = match haversine_distance(stop.latitude, stop.longitude, lat, lon) {
            Ok(d) => d,
            Err(_) => {
                // The stop itself can carry bad coordinates too
                aggregator.record_skipped();
                continue;
            }
        };

        match config.classify(distance) {
            Some(band_index) => aggregator.record(band_index, price, property.price_per_area),
            None => aggregator.record_unassigned(),
        }
    }

    debug!(
        stop_id = %stop.id,
        skipped = aggregator.skipped(),
        unassigned = aggregator.unassigned(),
        "Stop analyzed"
    );

    StopAnalysis {
        id: stop.id.clone(),
        name: stop.name.clone(),
        latitude: stop.latitude,
        longitude: stop.longitude,
        bands: aggregator.finalize(),
        skipped: aggregator.skipped(),
        unassigned: aggregator.unassigned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_M;

    fn stop_at(lat: f64, lon: f64) -> BusStop {
        BusStop {
            id: "stop-1".to_string(),
            name: "Test stop".to_string(),
            latitude: lat,
            longitude: lon,
            formatted_address: None,
            rating: None,
            user_ratings_total: None,
        }
    }

    fn property_at(lat: f64, lon: f64, price: Option<f64>) -> Property {
        Property {
            latitude: Some(lat),
            longitude: Some(lon),
            price,
            size: None,
            floor: None,
            rooms: None,
            bathrooms: None,
            price_per_area: None,
            url: None,
        }
    }

    /// Shifts a latitude north by `meters` along the meridian, which makes
    /// the haversine distance from the original point equal `meters` up to
    /// floating point noise.
    fn north_of(lat: f64, meters: f64) -> f64 {
        lat + (meters / EARTH_RADIUS_M).to_degrees()
    }

    #[test]
    fn test_valladolid_scenario() {
        let stop = stop_at(41.6529, -4.7286);
        let properties = vec![
            property_at(north_of(41.6529, 100.0), -4.7286, Some(100_000.0)),
            property_at(north_of(41.6529, 400.0), -4.7286, Some(200_000.0)),
            property_at(north_of(41.6529, 600.0), -4.7286, Some(300_000.0)),
            property_at(north_of(41.6529, 1500.0), -4.7286, Some(400_000.0)),
        ];
        let config = BandConfig::from_boundaries(&[500.0, 1000.0], false).unwrap();

        let results = analyze(&[stop], &properties, &config);
        assert_eq!(results.len(), 1);
        let r = &results[0];

        assert_eq!(r.bands[0].count, 2);
        assert_eq!(r.bands[0].mean_price, Some(150_000.0));
        assert_eq!(r.bands[1].count, 1);
        assert_eq!(r.bands[1].mean_price, Some(300_000.0));
        assert_eq!(r.unassigned, 1);
        assert_eq!(r.skipped, 0);
    }

    #[test]
    fn test_invalid_latitude_is_skipped_not_fatal() {
        let stop = stop_at(41.6529, -4.7286);
        let properties = vec![
            property_at(200.0, -4.7286, Some(100_000.0)),
            property_at(41.6529, -4.7286, Some(250_000.0)),
        ];
        let config = BandConfig::from_boundaries(&[500.0], false).unwrap();

        let results = analyze(&[stop], &properties, &config);
        let r = &results[0];

        assert_eq!(r.skipped, 1);
        assert_eq!(r.bands[0].count, 1);
        assert_eq!(r.bands[0].mean_price, Some(250_000.0));
    }

    #[test]
    fn test_missing_price_and_coordinates_are_skipped() {
        let stop = stop_at(41.6529, -4.7286);
        let properties = vec![
            property_at(41.6529, -4.7286, None),
            Property {
                latitude: None,
                ..property_at(41.6529, -4.7286, Some(100_000.0))
            },
        ];
        let config = BandConfig::from_boundaries(&[500.0], false).unwrap();

        let r = &analyze(&[stop], &properties, &config)[0];
        assert_eq!(r.skipped, 2);
        assert_eq!(r.bands[0].count, 0);
        assert_eq!(r.bands[0].mean_price, None);
    }

    #[test]
    fn test_zero_records_yields_no_data_for_every_stop() {
        let stops = vec![stop_at(41.6529, -4.7286), stop_at(41.66, -4.73)];
        let config = BandConfig::from_boundaries(&[500.0, 1000.0], true).unwrap();

        let results = analyze(&stops, &[], &config);
        assert_eq!(results.len(), 2);
        for r in &results {
            assert_eq!(r.bands.len(), 3);
            for band in &r.bands {
                assert_eq!(band.count, 0);
                assert_eq!(band.mean_price, None);
            }
            assert_eq!(r.skipped, 0);
            assert_eq!(r.unassigned, 0);
        }
    }

    #[test]
    fn test_conservation_law() {
        let stop = stop_at(41.6529, -4.7286);
        let mut properties = Vec::new();
        for i in 0..40 {
            let meters = i as f64 * 120.0;
            let price = if i % 7 == 0 { None } else { Some(1_000.0 + i as f64) };
            properties.push(property_at(north_of(41.6529, meters), -4.7286, price));
        }
        // A couple of records with broken coordinates
        properties.push(property_at(91.0, 0.0, Some(5_000.0)));
        properties.push(property_at(-91.0, 0.0, Some(5_000.0)));

        let config = BandConfig::from_boundaries(&[500.0, 1000.0, 2000.0], false).unwrap();
        let r = &analyze(&[stop], &properties, &config)[0];

        let banded: usize = r.bands.iter().map(|b| b.count).sum();
        assert_eq!(banded + r.unassigned + r.skipped, properties.len());
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let stop = stop_at(41.6529, -4.7286);
        let properties = vec![
            property_at(north_of(41.6529, 250.0), -4.7286, Some(120_000.0)),
            property_at(north_of(41.6529, 750.0), -4.7286, Some(180_000.0)),
        ];
        let config = BandConfig::from_boundaries(&[500.0, 1000.0], false).unwrap();

        let first = analyze(&[stop.clone()], &properties, &config);
        let second = analyze(&[stop], &properties, &config);

        assert_eq!(first[0].bands, second[0].bands);
        assert_eq!(first[0].skipped, second[0].skipped);
        assert_eq!(first[0].unassigned, second[0].unassigned);
    }
}
