use crate::config::RoutingConfig;
use crate::error::DispatchError;
use chrono::{Local, Timelike};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::eta;
use super::geocode::Geocoder;
use super::types::{GeoPoint, RoutePlan, RouteSummary, TravelMode};

/// Issues multi-waypoint directions requests.
#[async_trait::async_trait]
pub trait RouteService: Send + Sync {
    /// `coordinates` is ordered origin, waypoints, destination.
    async fn directions(
        &self,
        coordinates: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<RouteSummary, DispatchError>;
}

/// openrouteservice directions client (GeoJSON variant).
pub struct OrsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    /// `[lng, lat]` pairs, per the service's coordinate order.
    coordinates: Vec<[f64; 2]>,
    instructions: bool,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct Summary {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OrsClient {
    pub fn new(cfg: RoutingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.url,
            api_key: cfg.api_key,
        })
    }
}

#[async_trait::async_trait]
impl RouteService for OrsClient {
    async fn directions(
        &self,
        coordinates: &[GeoPoint],
        mode: TravelMode,
    ) -> Result<RouteSummary, DispatchError> {
        let url = format!(
            "{}/v2/directions/{}/geojson",
            self.base_url.trim_end_matches('/'),
            mode.as_str()
        );
        let body = DirectionsRequest {
            coordinates: coordinates.iter().map(|p| [p.lng, p.lat]).collect(),
            instructions: false,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DispatchError::Network(format!(
                "routing service answered {status}: {text}"
            )));
        }

        let parsed: DirectionsResponse = response.json().await?;
        let feature = parsed.features.into_iter().next().ok_or_else(|| {
            DispatchError::Network("routing service returned no route".to_string())
        })?;

        Ok(RouteSummary {
            distance_m: feature.properties.summary.distance,
            duration_s: feature.properties.summary.duration,
            polyline: feature
                .geometry
                .coordinates
                .into_iter()
                .map(|[lng, lat]| GeoPoint::new(lat, lng))
                .collect(),
        })
    }
}

/// Builds navigations out of geocoding and directions calls.
///
/// Waypoint resolution fans out concurrently and joins all-or-nothing: one
/// unresolvable place aborts the whole navigation before any route request.
pub struct RouteOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    service: Arc<dyn RouteService>,
}

impl RouteOrchestrator {
    pub fn new(geocoder: Arc<dyn Geocoder>, service: Arc<dyn RouteService>) -> Self {
        Self { geocoder, service }
    }

    /// Resolve destination and waypoints, then request one route ordered
    /// `[origin, waypoints.., destination]` with a heuristically adjusted
    /// duration.
    pub async fn plan(
        &self,
        origin: GeoPoint,
        destination: &str,
        waypoints: &[String],
        mode: TravelMode,
    ) -> Result<RoutePlan, DispatchError> {
        let mut places: Vec<&str> = vec![destination];
        places.extend(waypoints.iter().map(String::as_str));

        let resolved = self.resolve_all(&places).await?;
        let dest_point = resolved[0];
        let waypoint_points = resolved[1..].to_vec();

        let mut path = Vec::with_capacity(resolved.len() + 1);
        path.push(origin);
        path.extend(&waypoint_points);
        path.push(dest_point);

        let summary = self.service.directions(&path, mode).await?;
        let duration_s = eta::adjusted_duration(
            mode,
            summary.distance_m,
            summary.duration_s,
            Local::now().hour(),
        );
        debug!(
            distance_m = summary.distance_m,
            raw_s = summary.duration_s,
            adjusted_s = duration_s,
            "route planned"
        );

        Ok(RoutePlan {
            destination: dest_point,
            waypoints: waypoint_points,
            mode,
            distance_m: summary.distance_m,
            duration_s,
            polyline: summary.polyline,
        })
    }

    /// Straight great-circle distance between two named places, in km.
    pub async fn straight_line_km(&self, from: &str, to: &str) -> Result<f64, DispatchError> {
        let resolved = self.resolve_all(&[from, to]).await?;
        Ok(eta::haversine_km(resolved[0], resolved[1]))
    }

    /// Raw two-point directions result; the duration heuristic is not applied.
    pub async fn estimate(
        &self,
        from: &str,
        to: &str,
        mode: TravelMode,
    ) -> Result<RouteSummary, DispatchError> {
        let resolved = self.resolve_all(&[from, to]).await?;
        self.service.directions(&resolved, mode).await
    }

    /// Concurrent fan-out over the geocoder, joined all-or-nothing.
    async fn resolve_all(&self, places: &[&str]) -> Result<Vec<GeoPoint>, DispatchError> {
        let lookups = places.iter().map(|place| self.geocoder.resolve(place));
        let results = join_all(lookups).await;

        let mut points = Vec::with_capacity(places.len());
        for (place, result) in places.iter().zip(results) {
            match result? {
                Some(point) => points.push(point),
                None => return Err(DispatchError::Lookup((*place).to_string())),
            }
        }
        Ok(points)
    }
}
