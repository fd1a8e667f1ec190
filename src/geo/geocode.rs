use crate::config::GeocodingConfig;
use crate::error::DispatchError;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::types::GeoPoint;

/// Resolves a spoken place name to a coordinate pair.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the service answered but knows no such place.
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>, DispatchError>;
}

/// Nominatim-style lookup client. The first candidate wins.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    // Nominatim serializes coordinates as strings.
    lat: String,
    lon: String,
}

impl NominatimClient {
    pub fn new(cfg: GeocodingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.url,
        })
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimClient {
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>, DispatchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("format", "json"), ("q", place)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Network(format!(
                "geocoding service answered {status}"
            )));
        }

        let candidates: Vec<Candidate> = response.json().await?;
        let Some(first) = candidates.first() else {
            debug!("no geocoding candidates for {place:?}");
            return Ok(None);
        };

        let lat = first.lat.parse::<f64>();
        let lon = first.lon.parse::<f64>();
        match (lat, lon) {
            (Ok(lat), Ok(lng)) => Ok(Some(GeoPoint::new(lat, lng))),
            _ => Err(DispatchError::Network(
                "geocoding candidate had unparseable coordinates".to_string(),
            )),
        }
    }
}
