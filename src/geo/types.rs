use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Travel modes accepted by the routing service.
///
/// Anything outside the enumerated set is coerced to `DrivingCar`, so a
/// creative model output ("rocket-ship") degrades to the default instead of
/// failing the whole command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelMode {
    #[default]
    DrivingCar,
    CyclingRegular,
    FootWalking,
}

impl TravelMode {
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "cycling-regular" => TravelMode::CyclingRegular,
            "foot-walking" => TravelMode::FootWalking,
            _ => TravelMode::DrivingCar,
        }
    }

    /// Path segment used by the routing service.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::DrivingCar => "driving-car",
            TravelMode::CyclingRegular => "cycling-regular",
            TravelMode::FootWalking => "foot-walking",
        }
    }

    /// Human form for spoken feedback ("driving car").
    pub fn spoken(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

impl<'de> Deserialize<'de> for TravelMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TravelMode::coerce(&raw))
    }
}

/// A single position report from the device.
///
/// `speed` is in meters per second when the device provides one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub speed: Option<f64>,
}

impl PositionFix {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Raw directions result from the routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Route length in meters.
    pub distance_m: f64,
    /// Unadjusted travel time in seconds.
    pub duration_s: f64,
    /// Route geometry, ordered origin to destination.
    pub polyline: Vec<GeoPoint>,
}

/// A fully resolved navigation, ready for the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    pub mode: TravelMode,
    pub distance_m: f64,
    /// Heuristically adjusted travel time in seconds.
    pub duration_s: f64,
    pub polyline: Vec<GeoPoint>,
}
