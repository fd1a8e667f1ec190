//! Typed broadcast signals consumed by presentation collaborators.
//!
//! Signals are one-way and fire-and-forget: the engine never reads a response
//! back. Each variant carries exactly the payload its topic promises.

use crate::geo::{GeoPoint, TravelMode};
use crate::intent::PanDirection;
use serde::{Deserialize, Serialize};

/// Weather payload for the presentation card, as returned by the weather
/// collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCard {
    pub location: String,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub weather_code: u16,
}

/// Zoom step for the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomStep {
    In,
    Out,
}

/// View change for the map surface. Always layer-aware: every update carries
/// the session's current layer so the surface re-renders under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewUpdate {
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_to: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<PanDirection>,
}

impl MapViewUpdate {
    /// A bare layer refresh with no zoom or pan component.
    pub fn layer_only(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            zoom: None,
            zoom_to: None,
            zoom_level: None,
            pan: None,
        }
    }
}

/// A resolved route for the map surface to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRoute {
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    pub mode: TravelMode,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub polyline: Vec<GeoPoint>,
}

/// The engine's outward event contract.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastSignal {
    CheckTraffic,
    ShowTraffic,
    HideTraffic,
    FindFasterRoute,
    SearchNearMe { query: String },
    SearchPoi { query: String, location: Option<String> },
    SendWhatsapp { contact: String },
    ShowWeatherCard(WeatherCard),
    HideWeatherCard,
    MapView(MapViewUpdate),
    MapRoute(MapRoute),
}

impl BroadcastSignal {
    /// Stable topic name, part of the wire contract.
    pub fn topic(&self) -> &'static str {
        match self {
            BroadcastSignal::CheckTraffic => "checkTraffic",
            BroadcastSignal::ShowTraffic => "showTraffic",
            BroadcastSignal::HideTraffic => "hideTraffic",
            BroadcastSignal::FindFasterRoute => "findFasterRoute",
            BroadcastSignal::SearchNearMe { .. } => "searchNearMe",
            BroadcastSignal::SearchPoi { .. } => "searchPOI",
            BroadcastSignal::SendWhatsapp { .. } => "sendWhatsapp",
            BroadcastSignal::ShowWeatherCard(_) => "showWeatherCard",
            BroadcastSignal::HideWeatherCard => "hideWeatherCard",
            BroadcastSignal::MapView(_) => "mapView",
            BroadcastSignal::MapRoute(_) => "mapRoute",
        }
    }

    /// JSON payload published under the topic. Unit topics publish an empty
    /// object so subscribers can treat every payload uniformly.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            BroadcastSignal::CheckTraffic
            | BroadcastSignal::ShowTraffic
            | BroadcastSignal::HideTraffic
            | BroadcastSignal::FindFasterRoute
            | BroadcastSignal::HideWeatherCard => serde_json::json!({}),
            BroadcastSignal::SearchNearMe { query } => serde_json::json!({ "query": query }),
            BroadcastSignal::SearchPoi { query, location } => match location {
                Some(location) => serde_json::json!({ "query": query, "location": location }),
                None => serde_json::json!({ "query": query }),
            },
            BroadcastSignal::SendWhatsapp { contact } => serde_json::json!({ "contact": contact }),
            BroadcastSignal::ShowWeatherCard(card) => {
                serde_json::to_value(card).unwrap_or_default()
            }
            BroadcastSignal::MapView(update) => serde_json::to_value(update).unwrap_or_default(),
            BroadcastSignal::MapRoute(route) => serde_json::to_value(route).unwrap_or_default(),
        }
    }
}
