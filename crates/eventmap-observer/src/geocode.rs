//! Reverse geocoding through the Mapbox places API.
//!
//! Lookups are best-effort: any transport error, non-success status, or
//! response without features yields `None` and a log line.

use std::time::Duration;

use eventmap_core::Geocoder;
use eventmap_core::config::GeocoderConfig;
use eventmap_types::GeoPoint;
use tracing::{debug, warn};

/// [`Geocoder`] backed by `GET {base_url}/{lng},{lat}.json`.
#[derive(Clone)]
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for MapboxGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxGeocoder")
            .field("base_url", &self.base_url)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl MapboxGeocoder {
    /// Build a geocoder from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            access_token: config.access_token.clone(),
        })
    }

    /// Whether an access token is configured.
    pub fn is_enabled(&self) -> bool {
        !self.access_token.is_empty()
    }

    fn url(&self, point: GeoPoint) -> String {
        format!("{}/{},{}.json", self.base_url, point.lng, point.lat)
    }

    async fn fetch(&self, point: GeoPoint) -> Result<Option<String>, String> {
        let response = self
            .client
            .get(self.url(point))
            .query(&[("access_token", self.access_token.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("geocoder returned {status}"));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| format!("response parse failed: {e}"))?;
        Ok(extract_place_name(&json))
    }
}

/// First feature's `place_name`.
fn extract_place_name(json: &serde_json::Value) -> Option<String> {
    json.get("features")
        .and_then(|f| f.get(0))
        .and_then(|f| f.get("place_name"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

impl Geocoder for MapboxGeocoder {
    async fn lookup_address(&self, point: GeoPoint) -> Option<String> {
        if !self.is_enabled() || !point.is_valid() {
            return None;
        }
        match self.fetch(point).await {
            Ok(address) => {
                debug!(lat = point.lat, lng = point.lng, found = address.is_some(), "Reverse geocoded");
                address
            }
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn config(token: &str) -> GeocoderConfig {
        GeocoderConfig {
            access_token: token.to_owned(),
            base_url: "https://geo.example/places/".to_owned(),
            timeout_ms: 100,
        }
    }

    #[test]
    fn url_puts_longitude_first() {
        let geocoder = MapboxGeocoder::new(&config("t")).unwrap();
        let url = geocoder.url(GeoPoint {
            lat: 60.45,
            lng: 22.27,
        });
        assert_eq!(url, "https://geo.example/places/22.27,60.45.json");
    }

    #[test]
    fn place_name_comes_from_first_feature() {
        let json = serde_json::json!({
            "features": [
                { "place_name": "Aurakatu 1, Turku, Finland" },
                { "place_name": "Turku, Finland" }
            ]
        });
        assert_eq!(
            extract_place_name(&json).as_deref(),
            Some("Aurakatu 1, Turku, Finland")
        );
        assert_eq!(extract_place_name(&serde_json::json!({ "features": [] })), None);
    }

    #[tokio::test]
    async fn disabled_geocoder_answers_none() {
        let geocoder = MapboxGeocoder::new(&config("")).unwrap();
        assert!(!geocoder.is_enabled());
        let point = GeoPoint {
            lat: 60.45,
            lng: 22.27,
        };
        assert_eq!(geocoder.lookup_address(point).await, None);
    }
}
