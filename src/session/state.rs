use crate::geo::GeoPoint;
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Handle for an active journey watch. At most one exists per session.
#[derive(Debug)]
pub struct JourneyHandle {
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) task: JoinHandle<()>,
}

/// Session-scoped facts the dispatcher reads and writes between commands.
///
/// Owned by the engine and passed by reference into every handler; there are
/// no process-wide globals behind this.
#[derive(Debug)]
pub struct SessionState {
    /// Active map layer tag. Persists until a `change_layer` succeeds.
    pub last_layer: String,
    /// Most recent known device position.
    pub start_coords: Option<GeoPoint>,
    /// Destination of the last successful navigation. Persists across
    /// commands until overwritten.
    pub dest_coords: Option<GeoPoint>,
    /// Active journey watch, if tracking.
    pub journey: Option<JourneyHandle>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            last_layer: "streets".to_string(),
            start_coords: None,
            dest_coords: None,
            journey: None,
        }
    }
}

/// Read-only view for the HTTP session endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub last_layer: String,
    pub start_coords: Option<GeoPoint>,
    pub dest_coords: Option<GeoPoint>,
    pub journey_active: bool,
}

impl SessionState {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            last_layer: self.last_layer.clone(),
            start_coords: self.start_coords,
            dest_coords: self.dest_coords,
            journey_active: self.journey.is_some(),
        }
    }
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Fresh shared session with default facts.
pub fn shared_session() -> SharedSession {
    Arc::new(Mutex::new(SessionState::default()))
}
