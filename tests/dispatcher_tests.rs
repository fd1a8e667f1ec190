use async_trait::async_trait;
use geovoice::bridge::{BroadcastSignal, Notifier, WeatherCard};
use geovoice::collab::{MessagingPort, WeatherPort, WeatherReport};
use geovoice::error::DispatchError;
use geovoice::geo::{
    GeoPoint, Geocoder, PositionFix, PositionSource, RouteOrchestrator, RouteService,
    RouteSummary, TravelMode,
};
use geovoice::intent::{Intent, ZoomAction};
use geovoice::session::{shared_session, JourneyTracker, SharedSession};
use geovoice::CommandDispatcher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

// ============================================================================
// Mock collaborators
// ============================================================================

#[derive(Default)]
struct RecordingBridge {
    statuses: Mutex<Vec<String>>,
    spoken: Mutex<Vec<String>>,
    signals: Mutex<Vec<BroadcastSignal>>,
}

impl RecordingBridge {
    fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    fn spoken_contains(&self, needle: &str) -> bool {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .any(|line| line.contains(needle))
    }

    fn status_contains(&self, needle: &str) -> bool {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .any(|line| line.contains(needle))
    }

    fn signals(&self) -> Vec<BroadcastSignal> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingBridge {
    async fn speak(&self, message: &str) {
        self.spoken.lock().unwrap().push(message.to_string());
    }

    async fn set_status(&self, text: &str) {
        self.statuses.lock().unwrap().push(text.to_string());
    }

    async fn emit(&self, signal: BroadcastSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

struct StaticGeocoder {
    places: HashMap<String, GeoPoint>,
    calls: AtomicUsize,
}

impl StaticGeocoder {
    fn with(places: &[(&str, GeoPoint)]) -> Self {
        Self {
            places: places
                .iter()
                .map(|(name, point)| (name.to_string(), *point))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.places.get(&place.to_lowercase()).copied())
    }
}

/// Route service stub. With a gate, the first directions call blocks until a
/// permit is added, which lets tests interleave overlapping navigations.
struct GateRoutes {
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl GateRoutes {
    fn new(gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteService for GateRoutes {
    async fn directions(
        &self,
        coordinates: &[GeoPoint],
        _mode: TravelMode,
    ) -> Result<RouteSummary, DispatchError> {
        let call_index = self.calls.fetch_add(1, Ordering::SeqCst);
        if call_index == 0 {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
        }
        Ok(RouteSummary {
            distance_m: 10_000.0,
            duration_s: 600.0,
            polyline: coordinates.to_vec(),
        })
    }
}

struct StubPositions {
    fix: Option<PositionFix>,
}

#[async_trait]
impl PositionSource for StubPositions {
    async fn current(&self) -> Result<PositionFix, DispatchError> {
        self.fix
            .ok_or_else(|| DispatchError::Permission("denied".to_string()))
    }

    async fn watch(&self) -> Result<mpsc::Receiver<PositionFix>, DispatchError> {
        let fix = self
            .fix
            .ok_or_else(|| DispatchError::Permission("denied".to_string()))?;
        let (tx, rx) = mpsc::channel(4);
        tx.try_send(fix).unwrap();
        Ok(rx)
    }
}

struct StubWeather;

#[async_trait]
impl WeatherPort for StubWeather {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, DispatchError> {
        Ok(WeatherReport {
            message: format!("The weather in {location} is clear sky. Temperature is 25 degrees."),
            card: WeatherCard {
                location: location.to_string(),
                description: "Clear sky".to_string(),
                temperature: 25.0,
                feels_like: 26.0,
                humidity: 60.0,
                wind_speed: 2.0,
                weather_code: 0,
            },
        })
    }
}

struct StubMessaging;

#[async_trait]
impl MessagingPort for StubMessaging {
    async fn send_location(
        &self,
        contact: &str,
        _position: GeoPoint,
    ) -> Result<String, DispatchError> {
        Ok(format!("Message sent to {contact}!"))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    dispatcher: Arc<CommandDispatcher>,
    bridge: Arc<RecordingBridge>,
    session: SharedSession,
    geocoder: Arc<StaticGeocoder>,
    routes: Arc<GateRoutes>,
}

fn harness(
    places: &[(&str, GeoPoint)],
    fix: Option<PositionFix>,
    gate: Option<Arc<Semaphore>>,
) -> Harness {
    let bridge = Arc::new(RecordingBridge::default());
    let geocoder = Arc::new(StaticGeocoder::with(places));
    let routes = Arc::new(GateRoutes::new(gate));
    let positions: Arc<dyn PositionSource> = Arc::new(StubPositions { fix });
    let session = shared_session();

    let tracker = JourneyTracker::new(
        session.clone(),
        positions.clone(),
        bridge.clone() as Arc<dyn Notifier>,
    );
    let orchestrator = RouteOrchestrator::new(
        geocoder.clone() as Arc<dyn Geocoder>,
        routes.clone() as Arc<dyn RouteService>,
    );
    let dispatcher = Arc::new(CommandDispatcher::new(
        session.clone(),
        bridge.clone() as Arc<dyn Notifier>,
        geocoder.clone() as Arc<dyn Geocoder>,
        orchestrator,
        tracker,
        positions,
        Arc::new(StubWeather),
        Arc::new(StubMessaging),
    ));

    Harness {
        dispatcher,
        bridge,
        session,
        geocoder,
        routes,
    }
}

fn home_fix() -> PositionFix {
    PositionFix {
        lat: 12.97,
        lng: 77.59,
        speed: Some(0.0),
    }
}

const MUMBAI: GeoPoint = GeoPoint {
    lat: 19.07,
    lng: 72.87,
};
const PUNE: GeoPoint = GeoPoint {
    lat: 18.52,
    lng: 73.85,
};

async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn every_known_tag_updates_status() {
    let intents = vec![
        Intent::Navigate {
            destination: "Mumbai".to_string(),
            waypoints: vec!["Pune".to_string()],
            mode: TravelMode::DrivingCar,
        },
        Intent::Zoom {
            action: Some(ZoomAction::In),
            location: None,
            level: None,
        },
        Intent::Pan {
            direction: geovoice::intent::PanDirection::Up,
        },
        Intent::ChangeLayer {
            layer_type: Some("satellite".to_string()),
        },
        Intent::Distance {
            from: "Mumbai".to_string(),
            to: "Pune".to_string(),
        },
        Intent::GetEta {
            from: Some("Mumbai".to_string()),
            to: Some("Pune".to_string()),
            mode: TravelMode::DrivingCar,
        },
        Intent::StartJourney,
        Intent::StopJourney,
        Intent::SearchNearMe {
            query: "hospital".to_string(),
        },
        Intent::SearchPoi {
            query: "coffee shop".to_string(),
            location: None,
        },
        Intent::GetWeather {
            location: "Mangaluru".to_string(),
        },
        Intent::HideWeather,
        Intent::SendWhatsappLocation {
            contact: "Priya".to_string(),
        },
        Intent::CheckTraffic,
        Intent::ShowTraffic,
        Intent::HideTraffic,
        Intent::FindFasterRoute,
        Intent::Error { message: None },
        Intent::Unknown,
    ];

    for intent in intents {
        let h = harness(&[("mumbai", MUMBAI), ("pune", PUNE)], Some(home_fix()), None);
        let tag = intent.tag();
        h.dispatcher.dispatch(intent).await;
        let status = h.bridge.last_status();
        assert!(
            status.as_deref().is_some_and(|s| !s.is_empty()),
            "{tag} left no status update"
        );
    }
}

#[tokio::test]
async fn zoom_in_performs_no_network_calls() {
    let h = harness(&[("mumbai", MUMBAI)], Some(home_fix()), None);
    h.dispatcher
        .dispatch(Intent::Zoom {
            action: Some(ZoomAction::In),
            location: None,
            level: None,
        })
        .await;

    assert_eq!(h.geocoder.calls(), 0);
    assert_eq!(h.routes.calls(), 0);
    assert_eq!(h.bridge.last_status().as_deref(), Some("Zooming in"));
}

#[tokio::test]
async fn navigate_with_unresolvable_waypoint_aborts_whole_flow() {
    // Pune is deliberately absent from the geocoder.
    let h = harness(&[("mumbai", MUMBAI)], Some(home_fix()), None);
    h.dispatcher
        .dispatch(Intent::Navigate {
            destination: "Mumbai".to_string(),
            waypoints: vec!["Pune".to_string()],
            mode: TravelMode::DrivingCar,
        })
        .await;

    assert_eq!(h.session.lock().await.dest_coords, None);
    assert_eq!(h.routes.calls(), 0, "no route request may be issued");
    assert!(h.bridge.spoken_contains("could not find Pune"));
}

#[tokio::test]
async fn navigate_success_sets_destination_and_emits_route() {
    let h = harness(&[("mumbai", MUMBAI), ("pune", PUNE)], Some(home_fix()), None);
    h.dispatcher
        .dispatch(Intent::Navigate {
            destination: "Mumbai".to_string(),
            waypoints: vec!["Pune".to_string()],
            mode: TravelMode::DrivingCar,
        })
        .await;

    let state = h.session.lock().await;
    assert_eq!(state.dest_coords, Some(MUMBAI));
    assert_eq!(state.start_coords, Some(home_fix().point()));
    drop(state);

    assert!(h
        .bridge
        .signals()
        .iter()
        .any(|signal| matches!(signal, BroadcastSignal::MapRoute(route) if route.destination == MUMBAI)));
    assert!(h
        .bridge
        .spoken_contains("Starting navigation to Mumbai via Pune by driving car"));
}

#[tokio::test]
async fn navigate_without_position_speaks_distinct_message() {
    let h = harness(&[("mumbai", MUMBAI)], None, None);
    h.dispatcher
        .dispatch(Intent::Navigate {
            destination: "Mumbai".to_string(),
            waypoints: vec![],
            mode: TravelMode::DrivingCar,
        })
        .await;

    assert!(h.bridge.spoken_contains("Could not get your location"));
    assert_eq!(h.geocoder.calls(), 0);
    assert_eq!(h.session.lock().await.dest_coords, None);
}

#[tokio::test]
async fn journey_start_is_idempotent() {
    let h = harness(&[], Some(home_fix()), None);

    h.dispatcher.dispatch(Intent::StartJourney).await;
    assert!(h.session.lock().await.journey.is_some());
    assert!(h.bridge.spoken_contains("Journey started"));

    h.dispatcher.dispatch(Intent::StartJourney).await;
    assert!(h.bridge.spoken_contains("Journey already started"));

    // Tracking feedback from the buffered fix eventually lands in status.
    wait_for(|| h.bridge.status_contains("Tracking...")).await;

    h.dispatcher.dispatch(Intent::StopJourney).await;
    assert!(h.session.lock().await.journey.is_none());
    assert!(h.bridge.spoken_contains("Journey stopped"));
}

#[tokio::test]
async fn journey_stop_without_watch_is_a_noop() {
    let h = harness(&[], Some(home_fix()), None);
    h.dispatcher.dispatch(Intent::StopJourney).await;
    assert!(h.bridge.spoken_contains("No journey in progress to stop"));
    assert!(h.session.lock().await.journey.is_none());
}

#[tokio::test]
async fn eta_without_endpoints_short_circuits_to_corrective_prompt() {
    let h = harness(&[("mumbai", MUMBAI)], Some(home_fix()), None);
    h.dispatcher
        .dispatch(Intent::GetEta {
            from: None,
            to: Some("Mumbai".to_string()),
            mode: TravelMode::DrivingCar,
        })
        .await;

    assert!(h
        .bridge
        .spoken_contains("Please specify both start and destination"));
    assert_eq!(h.geocoder.calls(), 0);
    assert_eq!(h.routes.calls(), 0);
}

#[tokio::test]
async fn unknown_command_mutates_nothing() {
    let h = harness(&[("mumbai", MUMBAI)], Some(home_fix()), None);
    h.dispatcher.dispatch(Intent::Unknown).await;

    assert!(h.bridge.signals().is_empty());
    let state = h.session.lock().await;
    assert_eq!(state.last_layer, "streets");
    assert_eq!(state.dest_coords, None);
    assert!(h.bridge.spoken_contains("unknown command"));
}

#[tokio::test]
async fn change_layer_updates_session_and_refreshes_view() {
    let h = harness(&[], Some(home_fix()), None);
    h.dispatcher
        .dispatch(Intent::ChangeLayer {
            layer_type: Some("satellite".to_string()),
        })
        .await;

    assert_eq!(h.session.lock().await.last_layer, "satellite");
    assert!(h
        .bridge
        .signals()
        .iter()
        .any(|signal| matches!(signal, BroadcastSignal::MapView(update) if update.layer == "satellite")));
}

#[tokio::test]
async fn zoom_to_unset_destination_speaks_not_set() {
    let h = harness(&[], Some(home_fix()), None);
    h.dispatcher
        .dispatch(Intent::Zoom {
            action: Some(ZoomAction::ToDestination),
            location: None,
            level: None,
        })
        .await;

    assert!(h.bridge.spoken_contains("Destination is not set yet"));
    assert!(h.bridge.signals().is_empty());
}

#[tokio::test]
async fn superseded_navigate_does_not_overwrite_destination() {
    let slow = GeoPoint { lat: 1.0, lng: 1.0 };
    let fast = GeoPoint { lat: 2.0, lng: 2.0 };
    let gate = Arc::new(Semaphore::new(0));
    let h = harness(
        &[("slowtown", slow), ("fastcity", fast)],
        Some(home_fix()),
        Some(gate.clone()),
    );

    // First navigate blocks inside its route request.
    let first = {
        let dispatcher = h.dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .dispatch(Intent::Navigate {
                    destination: "SlowTown".to_string(),
                    waypoints: vec![],
                    mode: TravelMode::DrivingCar,
                })
                .await;
        })
    };
    wait_for(|| h.routes.calls() >= 1).await;

    // A newer navigate completes while the first is still in flight.
    h.dispatcher
        .dispatch(Intent::Navigate {
            destination: "FastCity".to_string(),
            waypoints: vec![],
            mode: TravelMode::DrivingCar,
        })
        .await;
    assert_eq!(h.session.lock().await.dest_coords, Some(fast));

    // Unblock the stale navigate; its result must be dropped.
    gate.add_permits(1);
    first.await.unwrap();
    assert_eq!(h.session.lock().await.dest_coords, Some(fast));
    assert!(!h.bridge.spoken_contains("Starting navigation to SlowTown"));
}
