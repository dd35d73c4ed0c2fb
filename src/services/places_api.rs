//! Trait and types for the nearby-places provider.

use anyhow::Result;
use stop_price_analyzer::stops::BusStop;

/// Circular search area around a center point.
#[derive(Debug, Clone, Copy)]
pub struct SearchArea {
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius in meters. Google caps this at 50,000.
    pub radius_m: u32,
}

/// Abstraction over a nearby-places provider (e.g., Google Places).
#[async_trait::async_trait]
pub trait PlacesApi {
    /// Returns all bus stops within the search area, with whatever metadata
    /// the provider exposes.
    async fn nearby_bus_stops(&self, area: &SearchArea) -> Result<Vec<BusStop>>;
}
