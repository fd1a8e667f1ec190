//! The validated command union produced from an utterance.
//!
//! Deserialization is strict: a known tag with a missing required field fails
//! and is downgraded to the `error` variant, an unrecognized tag becomes
//! `unknown`. The documented exceptions are fields the dispatcher validates
//! itself with a corrective spoken prompt (`get_eta.from/to`, the optional
//! zoom action/location/level) — those stay `Option` here.

use crate::geo::TravelMode;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Map pan directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanDirection::Left => "left",
            PanDirection::Right => "right",
            PanDirection::Up => "up",
            PanDirection::Down => "down",
        }
    }
}

/// Zoom targets. The aliases cover the model's habit of shortening
/// "to_start"/"to_destination".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomAction {
    In,
    Out,
    ToLocation,
    ToCurrentLocation,
    #[serde(alias = "start_point")]
    ToStart,
    #[serde(alias = "destination")]
    ToDestination,
}

/// A structured voice command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Intent {
    Navigate {
        destination: String,
        #[serde(default)]
        waypoints: Vec<String>,
        #[serde(default, deserialize_with = "lenient_mode")]
        mode: TravelMode,
    },
    Zoom {
        #[serde(default, deserialize_with = "lenient_zoom_action")]
        action: Option<ZoomAction>,
        #[serde(default)]
        location: Option<String>,
        #[serde(default)]
        level: Option<u8>,
    },
    Pan {
        direction: PanDirection,
    },
    ChangeLayer {
        #[serde(default)]
        layer_type: Option<String>,
    },
    Distance {
        from: String,
        to: String,
    },
    GetEta {
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        to: Option<String>,
        #[serde(default, deserialize_with = "lenient_mode")]
        mode: TravelMode,
    },
    StartJourney,
    StopJourney,
    SearchNearMe {
        query: String,
    },
    SearchPoi {
        #[serde(default)]
        query: String,
        #[serde(default)]
        location: Option<String>,
    },
    GetWeather {
        location: String,
    },
    HideWeather,
    SendWhatsappLocation {
        contact: String,
    },
    CheckTraffic,
    ShowTraffic,
    HideTraffic,
    FindFasterRoute,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    /// Any tag outside the supported set.
    #[serde(other)]
    Unknown,
}

impl Intent {
    /// Turn a raw model payload into a command, downgrading anything
    /// malformed to the `error` variant instead of failing.
    pub fn from_value(value: Value) -> Intent {
        let Some(tag) = value.get("command").and_then(Value::as_str) else {
            return Intent::Error {
                message: Some("payload carries no command tag".to_string()),
            };
        };
        let tag = tag.to_string();

        match serde_json::from_value::<Intent>(value) {
            Ok(intent) => intent,
            Err(err) => {
                debug!("malformed {tag} payload: {err}");
                Intent::Error {
                    message: Some(format!("malformed {tag} command")),
                }
            }
        }
    }

    /// Wire tag of this command, for logging and tests.
    pub fn tag(&self) -> &'static str {
        match self {
            Intent::Navigate { .. } => "navigate",
            Intent::Zoom { .. } => "zoom",
            Intent::Pan { .. } => "pan",
            Intent::ChangeLayer { .. } => "change_layer",
            Intent::Distance { .. } => "distance",
            Intent::GetEta { .. } => "get_eta",
            Intent::StartJourney => "start_journey",
            Intent::StopJourney => "stop_journey",
            Intent::SearchNearMe { .. } => "search_near_me",
            Intent::SearchPoi { .. } => "search_poi",
            Intent::GetWeather { .. } => "get_weather",
            Intent::HideWeather => "hide_weather",
            Intent::SendWhatsappLocation { .. } => "send_whatsapp_location",
            Intent::CheckTraffic => "check_traffic",
            Intent::ShowTraffic => "show_traffic",
            Intent::HideTraffic => "hide_traffic",
            Intent::FindFasterRoute => "find_faster_route",
            Intent::Error { .. } => "error",
            Intent::Unknown => "unknown",
        }
    }
}

/// Accept null/absent/unrecognized travel modes as driving-car.
fn lenient_mode<'de, D>(deserializer: D) -> Result<TravelMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(TravelMode::coerce).unwrap_or_default())
}

/// Accept null/absent/unrecognized zoom actions as `None`; the dispatcher
/// answers those with a corrective prompt.
fn lenient_zoom_action<'de, D>(deserializer: D) -> Result<Option<ZoomAction>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| serde_json::from_value(Value::String(s)).ok()))
}
