pub mod bridge;
pub mod capture;
pub mod collab;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod geo;
pub mod http;
pub mod intent;
pub mod session;

pub use bridge::{BroadcastSignal, MapRoute, MapViewUpdate, NatsBridge, Notifier, WeatherCard};
pub use capture::{LoopState, SpeechCaptureLoop, TranscriptEvent};
pub use collab::{MessagingPort, WeatherPort, WhatsappClient, WeatherClient};
pub use config::Config;
pub use dispatch::CommandDispatcher;
pub use error::DispatchError;
pub use geo::{
    GeoPoint, Geocoder, NatsPositionSource, NominatimClient, OrsClient, PositionFix,
    PositionSource, RouteOrchestrator, RouteService, TravelMode,
};
pub use http::{create_router, AppState};
pub use intent::{Intent, IntentInterpreter};
pub use session::{shared_session, JourneyTracker, SessionState};
