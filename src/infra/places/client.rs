//! Google Places implementation of [`PlacesApi`].
//!
//! Nearby-search results are paginated; each follow-up page requires the
//! `next_page_token` from the previous response and Google rejects the token
//! until a short delay has passed, hence the sleep between pages.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use stop_price_analyzer::fetch::{BasicClient, HttpClient, QueryKey, fetch_json};
use stop_price_analyzer::stops::BusStop;

use crate::services::places_api::{PlacesApi, SearchArea};

const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

/// Explicit configuration for the places client. Constructed once and passed
/// into [`GooglePlacesClient::new`]; there is no process-wide singleton.
pub struct PlacesConfig {
    pub api_key: String,
    pub base_url: String,
}

impl PlacesConfig {
    /// Reads `GOOGLE_MAPS_API_KEY` from the environment (populated from
    /// `.env` by the caller).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .context("GOOGLE_MAPS_API_KEY must be set")?;
        Ok(Self {
            api_key,
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
        })
    }
}

pub struct GooglePlacesClient {
    base_url: String,
    http: QueryKey<BasicClient>,
}

impl GooglePlacesClient {
    pub fn new(config: PlacesConfig) -> Result<Self> {
        let inner = BasicClient::with_timeouts(Duration::from_secs(30), Duration::from_secs(10))?;
        Ok(Self {
            base_url: config.base_url,
            http: QueryKey::google(inner, config.api_key),
        })
    }

    /// Fetches one nearby-search page and returns the parsed places along
    /// with the next page token, if any.
    async fn nearby_page(
        &self,
        area: &SearchArea,
        page_token: Option<&str>,
    ) -> Result<(Vec<serde_json::Value>, Option<String>)> {
        let mut url = format!(
            "{}/nearbysearch/json?location={},{}&radius={}&type=bus_station",
            self.base_url, area.latitude, area.longitude, area.radius_m
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pagetoken={token}"));
        }

        let json = fetch_json(&self.http, &url).await?;

        let status = json["status"].as_str().unwrap_or("");
        if status != "OK" && status != "ZERO_RESULTS" {
            bail!("places nearby search returned status {status}");
        }

        let results = json["results"].as_array().cloned().unwrap_or_default();
        let next = json["next_page_token"].as_str().map(|s| s.to_string());
        Ok((results, next))
    }

    /// Looks up address and rating details for a place. Detail failures are
    /// not fatal; the stop keeps whatever the search result carried.
    async fn place_details(&self, place_id: &str) -> Option<serde_json::Value> {
        let url = format!(
            "{}/details/json?place_id={}&fields=formatted_address,rating,user_ratings_total",
            self.base_url, place_id
        );

        match fetch_json(&self.http, &url).await {
            Ok(json) if json["status"].as_str() == Some("OK") => Some(json["result"].clone()),
            Ok(json) => {
                warn!(place_id, status = ?json["status"], "Place details lookup rejected");
                None
            }
            Err(e) => {
                warn!(place_id, error = %e, "Place details lookup failed");
                None
            }
        }
    }

    fn parse_place(place: &serde_json::Value) -> Option<BusStop> {
        let location = &place["geometry"]["location"];
        Some(BusStop {
            id: place["place_id"].as_str()?.to_string(),
            name: place["name"].as_str().unwrap_or("Unknown").to_string(),
            latitude: location["lat"].as_f64()?,
            longitude: location["lng"].as_f64()?,
            formatted_address: None,
            rating: None,
            user_ratings_total: None,
        })
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn nearby_bus_stops(&self, area: &SearchArea) -> Result<Vec<BusStop>> {
        let mut stops = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let (places, next) = self.nearby_page(area, page_token.as_deref()).await?;
            debug!(page_size = places.len(), "Nearby search page received");

            for place in &places {
                let Some(mut stop) = Self::parse_place(place) else {
                    warn!("Skipping place without id or location");
                    continue;
                };

                if let Some(details) = self.place_details(&stop.id).await {
                    stop.formatted_address =
                        details["formatted_address"].as_str().map(|s| s.to_string());
                    stop.rating = details["rating"].as_f64();
                    stop.user_ratings_total = details["user_ratings_total"].as_u64();
                }

                stops.push(stop);
            }

            match next {
                Some(token) => {
                    // Google requires a pause before the token becomes valid
                    tokio::time::sleep(PAGE_TOKEN_DELAY).await;
                    page_token = Some(token);
                }
                None => break,
            }
        }

        Ok(stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place_extracts_core_fields() {
        let place = serde_json::json!({
            "place_id": "ChIJabc",
            "name": "Estación de Autobuses",
            "geometry": { "location": { "lat": 41.64, "lng": -4.73 } }
        });

        let stop = GooglePlacesClient::parse_place(&place).unwrap();
        assert_eq!(stop.id, "ChIJabc");
        assert_eq!(stop.name, "Estación de Autobuses");
        assert_eq!(stop.latitude, 41.64);
        assert_eq!(stop.longitude, -4.73);
    }

    #[test]
    fn test_parse_place_without_location_is_none() {
        let place = serde_json::json!({ "place_id": "ChIJabc", "name": "x" });
        assert!(GooglePlacesClient::parse_place(&place).is_none());
    }

    #[test]
    fn test_parse_place_defaults_missing_name() {
        let place = serde_json::json!({
            "place_id": "ChIJabc",
            "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
        });
        assert_eq!(GooglePlacesClient::parse_place(&place).unwrap().name, "Unknown");
    }
}
