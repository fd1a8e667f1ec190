use crate::bridge::{BroadcastSignal, MapRoute, MapViewUpdate, Notifier, ZoomStep};
use crate::collab::{MessagingPort, WeatherPort};
use crate::error::DispatchError;
use crate::geo::{GeoPoint, Geocoder, PositionSource, RouteOrchestrator, TravelMode};
use crate::intent::{Intent, PanDirection, ZoomAction};
use crate::session::{JourneyTracker, SharedSession};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The central command state machine.
///
/// `dispatch` consumes one validated intent and drives the session,
/// collaborators, and notification bridge accordingly. It never returns an
/// error and never panics on collaborator failure: every known variant ends
/// in a status update, and every failure path has its own spoken recovery.
pub struct CommandDispatcher {
    session: SharedSession,
    bridge: Arc<dyn Notifier>,
    geocoder: Arc<dyn Geocoder>,
    routes: RouteOrchestrator,
    tracker: JourneyTracker,
    positions: Arc<dyn PositionSource>,
    weather: Arc<dyn WeatherPort>,
    messaging: Arc<dyn MessagingPort>,
    /// Navigation generation counter: a completing navigate whose generation
    /// is no longer current was superseded and must not commit its result.
    nav_generation: AtomicU64,
}

impl CommandDispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: SharedSession,
        bridge: Arc<dyn Notifier>,
        geocoder: Arc<dyn Geocoder>,
        routes: RouteOrchestrator,
        tracker: JourneyTracker,
        positions: Arc<dyn PositionSource>,
        weather: Arc<dyn WeatherPort>,
        messaging: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            session,
            bridge,
            geocoder,
            routes,
            tracker,
            positions,
            weather,
            messaging,
            nav_generation: AtomicU64::new(0),
        }
    }

    pub async fn dispatch(&self, intent: Intent) {
        let cmd_id = Uuid::new_v4();
        debug!(%cmd_id, command = intent.tag(), "dispatching");

        match intent {
            Intent::Navigate {
                destination,
                waypoints,
                mode,
            } => self.handle_navigate(&destination, &waypoints, mode).await,
            Intent::Zoom {
                action,
                location,
                level,
            } => self.handle_zoom(action, location.as_deref(), level).await,
            Intent::Pan { direction } => self.handle_pan(direction).await,
            Intent::ChangeLayer { layer_type } => {
                self.handle_change_layer(layer_type.as_deref()).await
            }
            Intent::Distance { from, to } => self.handle_distance(&from, &to).await,
            Intent::GetEta { from, to, mode } => {
                self.handle_eta(from.as_deref(), to.as_deref(), mode).await
            }
            Intent::StartJourney => self.tracker.start().await,
            Intent::StopJourney => self.tracker.stop().await,
            Intent::SearchNearMe { query } => {
                let feedback = format!("Searching for {query} near you...");
                self.bridge.set_status(&feedback).await;
                self.bridge.speak(&feedback).await;
                self.bridge
                    .emit(BroadcastSignal::SearchNearMe { query })
                    .await;
            }
            Intent::SearchPoi { query, location } => self.handle_search_poi(query, location).await,
            Intent::GetWeather { location } => self.handle_weather(&location).await,
            Intent::HideWeather => {
                self.bridge.set_status("Hiding weather card.").await;
                self.bridge.speak("Okay, hiding weather.").await;
                self.bridge.emit(BroadcastSignal::HideWeatherCard).await;
            }
            Intent::SendWhatsappLocation { contact } => self.handle_whatsapp(&contact).await,
            Intent::CheckTraffic => {
                self.bridge.emit(BroadcastSignal::CheckTraffic).await;
                self.bridge
                    .set_status("Checking real-time traffic conditions ahead...")
                    .await;
                self.bridge
                    .speak("Checking real-time traffic conditions ahead.")
                    .await;
            }
            Intent::ShowTraffic => {
                self.bridge.emit(BroadcastSignal::ShowTraffic).await;
                self.bridge
                    .set_status("Showing traffic overlay on the map.")
                    .await;
                self.bridge.speak("Showing traffic overlay on the map.").await;
            }
            Intent::HideTraffic => {
                self.bridge.emit(BroadcastSignal::HideTraffic).await;
                self.bridge
                    .set_status("Hiding traffic overlay from the map.")
                    .await;
                self.bridge
                    .speak("Hiding traffic overlay from the map.")
                    .await;
            }
            Intent::FindFasterRoute => {
                self.bridge.emit(BroadcastSignal::FindFasterRoute).await;
                self.bridge.set_status("Searching for a faster route...").await;
                self.bridge.speak("Searching for a faster route.").await;
            }
            Intent::Error { message } => {
                if let Some(message) = message {
                    info!("model reported: {message}");
                }
                self.bridge.set_status("Could not interpret command").await;
                self.bridge
                    .speak("Sorry, I could not understand that.")
                    .await;
            }
            Intent::Unknown => {
                self.bridge.set_status("Sorry, unknown command").await;
                self.bridge.speak("Sorry, unknown command.").await;
            }
        }
    }

    /// Current map layer for layer-aware map signals.
    async fn current_layer(&self) -> String {
        self.session.lock().await.last_layer.clone()
    }

    async fn handle_navigate(&self, destination: &str, waypoints: &[String], mode: TravelMode) {
        let fix = match self.positions.current().await {
            Ok(fix) => fix,
            Err(err) => {
                warn!("navigate aborted: {err}");
                self.bridge.set_status("Could not get your location").await;
                self.bridge.speak("Could not get your location").await;
                return;
            }
        };
        let origin = fix.point();
        {
            self.session.lock().await.start_coords = Some(origin);
        }

        // Newer navigations supersede this one: remember our generation and
        // refuse to commit if it moved on while the plan was in flight.
        let generation = self.nav_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let plan = match self.routes.plan(origin, destination, waypoints, mode).await {
            Ok(plan) => plan,
            Err(DispatchError::Lookup(place)) => {
                self.bridge
                    .set_status(&format!("Could not find {place}"))
                    .await;
                self.bridge
                    .speak(&format!("I could not find {place}."))
                    .await;
                return;
            }
            Err(err) => {
                warn!("route planning failed: {err}");
                self.bridge.set_status("Failed to plan the route").await;
                self.bridge
                    .speak("Sorry, the navigation request failed.")
                    .await;
                return;
            }
        };

        if self.nav_generation.load(Ordering::SeqCst) != generation {
            debug!("navigation to {destination} superseded, dropping result");
            return;
        }

        let layer = {
            let mut state = self.session.lock().await;
            state.dest_coords = Some(plan.destination);
            state.last_layer.clone()
        };

        self.bridge
            .emit(BroadcastSignal::MapRoute(MapRoute {
                destination: plan.destination,
                waypoints: plan.waypoints.clone(),
                mode: plan.mode,
                distance_meters: plan.distance_m,
                duration_seconds: plan.duration_s,
                polyline: plan.polyline,
            }))
            .await;
        self.bridge
            .emit(BroadcastSignal::MapView(MapViewUpdate::layer_only(layer)))
            .await;

        // Waypoints that duplicate the destination add nothing to the spoken
        // feedback.
        let spoken_waypoints: Vec<&str> = waypoints
            .iter()
            .filter(|wp| !wp.eq_ignore_ascii_case(destination))
            .map(String::as_str)
            .collect();
        let mut feedback = format!("Starting navigation to {destination}");
        if !spoken_waypoints.is_empty() {
            feedback.push_str(&format!(" via {}", spoken_waypoints.join(" and ")));
        }
        feedback.push_str(&format!(" by {}", mode.spoken()));

        self.bridge.set_status(&feedback).await;
        self.bridge.speak(&feedback).await;
    }

    async fn handle_zoom(
        &self,
        action: Option<ZoomAction>,
        location: Option<&str>,
        level: Option<u8>,
    ) {
        match action {
            Some(step @ (ZoomAction::In | ZoomAction::Out)) => {
                let mut update = MapViewUpdate::layer_only(self.current_layer().await);
                update.zoom = Some(if step == ZoomAction::In {
                    ZoomStep::In
                } else {
                    ZoomStep::Out
                });
                self.bridge.emit(BroadcastSignal::MapView(update)).await;
                let text = if step == ZoomAction::In {
                    "Zooming in"
                } else {
                    "Zooming out"
                };
                self.bridge.set_status(text).await;
                self.bridge.speak(text).await;
            }
            Some(ZoomAction::ToLocation) => {
                let Some(place) = location else {
                    self.zoom_not_understood().await;
                    return;
                };
                self.bridge
                    .set_status(&format!("Zooming to {place}..."))
                    .await;
                match self.geocoder.resolve(place).await {
                    Ok(Some(point)) => {
                        self.emit_zoom_to(point, level.unwrap_or(15)).await;
                        self.bridge.set_status(&format!("Zoomed to {place}")).await;
                        self.bridge.speak(&format!("Zoomed to {place}")).await;
                    }
                    Ok(None) => {
                        self.bridge
                            .set_status(&format!("Place not found: {place}"))
                            .await;
                        self.bridge.speak(&format!("Could not find {place}")).await;
                    }
                    Err(err) => {
                        warn!("zoom lookup failed: {err}");
                        self.bridge
                            .set_status(&format!("Failed to fetch location for {place}"))
                            .await;
                        self.bridge.speak(&format!("Failed to find {place}")).await;
                    }
                }
            }
            Some(ZoomAction::ToCurrentLocation) => match self.positions.current().await {
                Ok(fix) => {
                    self.emit_zoom_to(fix.point(), level.unwrap_or(15)).await;
                    self.bridge
                        .set_status("Zooming to your current location")
                        .await;
                    self.bridge.speak("Zooming to your current location").await;
                }
                Err(err) => {
                    warn!("zoom to current location failed: {err}");
                    self.bridge.set_status("Could not get current location").await;
                    self.bridge
                        .speak("Could not get your current location")
                        .await;
                }
            },
            Some(ZoomAction::ToStart) => {
                let start = self.session.lock().await.start_coords;
                match start {
                    Some(point) => {
                        self.emit_zoom_to(point, level.unwrap_or(14)).await;
                        self.bridge.set_status("Zooming to starting point").await;
                        self.bridge.speak("Zooming to your start point").await;
                    }
                    None => {
                        self.bridge.set_status("No starting point available").await;
                        self.bridge.speak("No starting point set yet").await;
                    }
                }
            }
            Some(ZoomAction::ToDestination) => {
                let dest = self.session.lock().await.dest_coords;
                match dest {
                    Some(point) => {
                        self.emit_zoom_to(point, level.unwrap_or(14)).await;
                        self.bridge.set_status("Zooming to your destination").await;
                        self.bridge.speak("Zooming to your destination").await;
                    }
                    None => {
                        self.bridge.set_status("No destination set").await;
                        self.bridge.speak("Destination is not set yet").await;
                    }
                }
            }
            None => match level {
                Some(level) => {
                    let mut update = MapViewUpdate::layer_only(self.current_layer().await);
                    update.zoom_level = Some(level);
                    self.bridge.emit(BroadcastSignal::MapView(update)).await;
                    self.bridge
                        .set_status(&format!("Zooming to level {level}"))
                        .await;
                    self.bridge.speak(&format!("Zooming to level {level}")).await;
                }
                None => self.zoom_not_understood().await,
            },
        }
    }

    async fn emit_zoom_to(&self, point: GeoPoint, level: u8) {
        let mut update = MapViewUpdate::layer_only(self.current_layer().await);
        update.zoom_to = Some(point);
        update.zoom_level = Some(level);
        self.bridge.emit(BroadcastSignal::MapView(update)).await;
    }

    async fn zoom_not_understood(&self) {
        self.bridge.set_status("Zoom command not understood").await;
        self.bridge.speak("Did not understand zoom command").await;
    }

    async fn handle_pan(&self, direction: PanDirection) {
        let mut update = MapViewUpdate::layer_only(self.current_layer().await);
        update.pan = Some(direction);
        self.bridge.emit(BroadcastSignal::MapView(update)).await;
        let text = format!("Panning {}", direction.as_str());
        self.bridge.set_status(&text).await;
        self.bridge.speak(&text).await;
    }

    async fn handle_change_layer(&self, layer_type: Option<&str>) {
        let layer = layer_type.unwrap_or("streets").to_string();
        {
            self.session.lock().await.last_layer = layer.clone();
        }
        self.bridge
            .set_status(&format!("Switching to {layer} view"))
            .await;
        self.bridge.speak(&format!("Switching to {layer} view")).await;
        // Re-render the current view under the new layer.
        self.bridge
            .emit(BroadcastSignal::MapView(MapViewUpdate::layer_only(layer)))
            .await;
    }

    async fn handle_distance(&self, from: &str, to: &str) {
        match self.routes.straight_line_km(from, to).await {
            Ok(km) => {
                self.bridge
                    .set_status(&format!("Distance: {km:.1} km"))
                    .await;
                self.bridge
                    .speak(&format!("Distance is {km:.1} kilometers"))
                    .await;
            }
            Err(err) if err.is_lookup() => {
                self.bridge.set_status("Could not fetch both locations").await;
                self.bridge.speak("Could not fetch locations").await;
            }
            Err(err) => {
                warn!("distance lookup failed: {err}");
                self.bridge.set_status("Failed to fetch location data").await;
                self.bridge.speak("Failed to fetch location data").await;
            }
        }
    }

    async fn handle_eta(&self, from: Option<&str>, to: Option<&str>, mode: TravelMode) {
        let (Some(from), Some(to)) = (from, to) else {
            self.bridge
                .set_status("Please specify both start and destination for ETA")
                .await;
            self.bridge
                .speak("Please specify both start and destination to calculate ETA")
                .await;
            return;
        };

        match self.routes.estimate(from, to, mode).await {
            Ok(summary) => {
                let eta = spoken_eta(summary.duration_s);
                self.bridge
                    .set_status(&format!("Estimated time of arrival: {eta}"))
                    .await;
                self.bridge
                    .speak(&format!("The estimated time of arrival is {eta}"))
                    .await;
            }
            Err(err) if err.is_lookup() => {
                self.bridge
                    .set_status("Could not find start or destination location")
                    .await;
                self.bridge
                    .speak("Could not find start or destination location")
                    .await;
            }
            Err(err) => {
                warn!("eta request failed: {err}");
                self.bridge.set_status("Failed to fetch ETA").await;
                self.bridge.speak("Failed to fetch estimated time").await;
            }
        }
    }

    async fn handle_search_poi(&self, query: String, location: Option<String>) {
        let mut feedback = format!("Searching for {query}");
        match &location {
            Some(location) => feedback.push_str(&format!(" near {location}")),
            None => feedback.push_str(" in the current map view"),
        }
        self.bridge
            .emit(BroadcastSignal::SearchPoi { query, location })
            .await;
        self.bridge.set_status(&format!("{feedback}...")).await;
        self.bridge.speak(&feedback).await;
    }

    async fn handle_weather(&self, location: &str) {
        let checking = format!("Checking the weather in {location}...");
        self.bridge.set_status(&checking).await;
        self.bridge.speak(&checking).await;

        match self.weather.fetch(location).await {
            Ok(report) => {
                let headline = report
                    .message
                    .split('.')
                    .next()
                    .unwrap_or(&report.message)
                    .to_string();
                self.bridge.set_status(&headline).await;
                self.bridge.speak(&report.message).await;
                self.bridge
                    .emit(BroadcastSignal::ShowWeatherCard(report.card))
                    .await;
            }
            Err(err) => {
                warn!("weather fetch failed: {err}");
                self.bridge.set_status(&format!("Error: {err}")).await;
                self.bridge
                    .speak("Sorry, I couldn't get the weather information.")
                    .await;
            }
        }
    }

    async fn handle_whatsapp(&self, contact: &str) {
        let fix = match self.positions.current().await {
            Ok(fix) => fix,
            Err(err) => {
                warn!("location share aborted: {err}");
                self.bridge.set_status("Could not get your location").await;
                self.bridge.speak("Could not get your location").await;
                return;
            }
        };

        let contact_key = contact.to_lowercase();
        let feedback = format!("Sending location to {contact} on WhatsApp...");
        self.bridge.set_status(&feedback).await;
        self.bridge.speak(&feedback).await;
        self.bridge
            .emit(BroadcastSignal::SendWhatsapp {
                contact: contact_key.clone(),
            })
            .await;

        match self.messaging.send_location(&contact_key, fix.point()).await {
            Ok(message) => {
                self.bridge.set_status(&message).await;
                self.bridge.speak(&message).await;
            }
            Err(err) if err.is_lookup() => {
                self.bridge
                    .set_status(&format!("Contact not found: {contact}"))
                    .await;
                self.bridge
                    .speak(&format!("Could not find contact {contact}."))
                    .await;
            }
            Err(err) => {
                warn!("location share failed: {err}");
                self.bridge.set_status("Failed to send WhatsApp message").await;
                self.bridge.speak("Failed to send WhatsApp message.").await;
            }
        }
    }
}

/// Human form of a duration in seconds, matching the spoken ETA phrasing.
fn spoken_eta(duration_s: f64) -> String {
    let minutes = (duration_s / 60.0).round() as i64;
    if minutes >= 60 {
        format!("{} hour(s) {} minute(s)", minutes / 60, minutes % 60)
    } else {
        format!("{minutes} minute(s)")
    }
}
