use crate::bridge::Notifier;
use crate::geo::{GeoPoint, PositionFix, PositionSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::state::{JourneyHandle, SharedSession};

/// Manages the continuous position subscription used while a journey is
/// being tracked.
///
/// Both `start` and `stop` are idempotent; duplicate subscriptions are never
/// created, and the watch is released on every session exit path.
#[derive(Clone)]
pub struct JourneyTracker {
    session: SharedSession,
    positions: Arc<dyn PositionSource>,
    bridge: Arc<dyn Notifier>,
}

impl JourneyTracker {
    pub fn new(
        session: SharedSession,
        positions: Arc<dyn PositionSource>,
        bridge: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            positions,
            bridge,
        }
    }

    pub async fn start(&self) {
        let mut state = self.session.lock().await;
        if state.journey.is_some() {
            self.bridge
                .set_status("Journey already started, tracking your movement...")
                .await;
            self.bridge
                .speak("Journey already started, tracking your movement.")
                .await;
            return;
        }

        let rx = match self.positions.watch().await {
            Ok(rx) => rx,
            Err(err) => {
                info!("journey watch unavailable: {err}");
                self.bridge.set_status("Geolocation not supported.").await;
                self.bridge
                    .speak("Geolocation is not supported on this device.")
                    .await;
                return;
            }
        };

        self.bridge
            .set_status("Journey started, tracking your movement...")
            .await;
        self.bridge
            .speak("Journey started, tracking your movement.")
            .await;

        let stop = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(watch_positions(
            rx,
            Arc::clone(&stop),
            self.session.clone(),
            Arc::clone(&self.bridge),
        ));
        state.journey = Some(JourneyHandle { stop, task });
    }

    pub async fn stop(&self) {
        let handle = self.session.lock().await.journey.take();
        match handle {
            Some(handle) => {
                handle.stop.store(true, Ordering::SeqCst);
                handle.task.abort();
                self.bridge
                    .set_status("Journey stopped, tracking disabled.")
                    .await;
                self.bridge.speak("Journey stopped. Tracking disabled.").await;
            }
            None => {
                self.bridge
                    .set_status("No journey in progress to stop.")
                    .await;
                self.bridge.speak("No journey in progress to stop.").await;
            }
        }
    }

    /// Silent teardown for session shutdown: releases the watch without
    /// spoken feedback.
    pub async fn release(&self) {
        if let Some(handle) = self.session.lock().await.journey.take() {
            handle.stop.store(true, Ordering::SeqCst);
            handle.task.abort();
            debug!("journey watch released on shutdown");
        }
    }
}

/// Per-fix feedback: current coordinates, planar distance to the known
/// destination (raw coordinate difference in degrees, not geodesic), and
/// speed converted from m/s to km/h.
async fn watch_positions(
    mut rx: mpsc::Receiver<PositionFix>,
    stop: Arc<AtomicBool>,
    session: SharedSession,
    bridge: Arc<dyn Notifier>,
) {
    while let Some(fix) = rx.recv().await {
        if stop.load(Ordering::SeqCst) {
            break;
        }

        let destination = {
            let mut state = session.lock().await;
            state.start_coords = Some(fix.point());
            state.dest_coords
        };

        bridge.set_status(&journey_feedback(&fix, destination)).await;
    }
    debug!("journey watch task stopped");
}

fn journey_feedback(fix: &PositionFix, destination: Option<GeoPoint>) -> String {
    let mut feedback = format!("Tracking... Lat {:.4}, Lng {:.4}", fix.lat, fix.lng);
    if let Some(to) = destination {
        let dist = ((fix.lat - to.lat).powi(2) + (fix.lng - to.lng).powi(2)).sqrt();
        feedback.push_str(&format!(" | Distance to destination: {dist:.2} (deg)"));
    }
    if let Some(speed) = fix.speed {
        feedback.push_str(&format!(" | Speed: {:.1} km/h", speed * 3.6));
    }
    feedback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_reports_planar_distance_and_kmh_speed() {
        let fix = PositionFix {
            lat: 13.0,
            lng: 77.5,
            speed: Some(10.0),
        };
        let feedback = journey_feedback(&fix, Some(GeoPoint::new(13.0, 78.5)));
        assert!(feedback.contains("Lat 13.0000, Lng 77.5000"));
        assert!(feedback.contains("Distance to destination: 1.00 (deg)"));
        assert!(feedback.contains("Speed: 36.0 km/h"));
    }

    #[test]
    fn feedback_without_destination_or_speed() {
        let fix = PositionFix {
            lat: -2.5,
            lng: 140.25,
            speed: None,
        };
        let feedback = journey_feedback(&fix, None);
        assert_eq!(feedback, "Tracking... Lat -2.5000, Lng 140.2500");
    }

    #[test]
    fn zero_speed_is_still_reported() {
        let fix = PositionFix {
            lat: 0.0,
            lng: 0.0,
            speed: Some(0.0),
        };
        let feedback = journey_feedback(&fix, None);
        assert!(feedback.ends_with("Speed: 0.0 km/h"));
    }
}
