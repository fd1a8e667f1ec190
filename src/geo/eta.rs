//! Duration adjustment and straight-line distance helpers.
//!
//! The routing service returns free-flow durations that are consistently
//! optimistic, so driving estimates get a distance-bucketed multiplier with a
//! rush-hour surcharge on top; cycling and walking get flat factors.

use super::types::{GeoPoint, TravelMode};

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum adjusted driving duration for very short hops, in seconds.
const SHORT_HOP_FLOOR_S: f64 = 300.0;

/// Scale a raw routing-service duration into a realistic estimate.
///
/// `local_hour` is the 0-23 hour at the caller's location; the rush-hour
/// surcharge applies to driving only, for hours 7-10 and 17-20 inclusive.
pub fn adjusted_duration(
    mode: TravelMode,
    distance_m: f64,
    raw_duration_s: f64,
    local_hour: u32,
) -> f64 {
    match mode {
        TravelMode::DrivingCar => {
            let mut adjusted = if distance_m < 2_000.0 {
                (raw_duration_s * 3.0).max(SHORT_HOP_FLOOR_S)
            } else if distance_m < 5_000.0 {
                raw_duration_s * 2.5
            } else if distance_m < 12_000.0 {
                raw_duration_s * 2.2
            } else if distance_m < 20_000.0 {
                raw_duration_s * 2.0
            } else if distance_m < 50_000.0 {
                raw_duration_s * 1.8
            } else if distance_m < 100_000.0 {
                raw_duration_s * 1.7
            } else if distance_m < 200_000.0 {
                raw_duration_s * 1.65
            } else if distance_m < 300_000.0 {
                raw_duration_s * 1.6
            } else if distance_m < 500_000.0 {
                raw_duration_s * 1.55
            } else if distance_m < 700_000.0 {
                raw_duration_s * 1.5
            } else if distance_m < 900_000.0 {
                raw_duration_s * 1.45
            } else {
                raw_duration_s * 1.4
            };

            if is_peak_hour(local_hour) {
                adjusted *= 1.2;
            }
            adjusted
        }
        TravelMode::CyclingRegular => raw_duration_s * 1.35,
        TravelMode::FootWalking => raw_duration_s * 1.25,
    }
}

fn is_peak_hour(hour: u32) -> bool {
    (7..=10).contains(&hour) || (17..=20).contains(&hour)
}

/// Great-circle distance between two points in kilometers (haversine).
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
