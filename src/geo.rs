//! Great-circle distance on a spherical Earth.

use crate::error::AnalysisError;

/// Mean Earth radius in meters. Spherical-earth accuracy is sufficient at
/// sub-city scale; band widths are hundreds of meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Returns `Err` when a latitude is outside −90..90 or a longitude outside
/// −180..180. NaN fails both comparisons and is rejected the same way.
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), AnalysisError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AnalysisError::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    Ok(())
}

/// Haversine distance in meters between two (latitude, longitude) pairs in
/// degrees.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidCoordinate`] when either input is out of
/// range; callers skip the offending record rather than abort.
pub fn haversine_distance(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> Result<f64, AnalysisError> {
    validate_coordinate(lat1, lon1)?;
    validate_coordinate(lat2, lon2)?;

    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Ok(EARTH_RADIUS_M * c)
}
