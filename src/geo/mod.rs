//! Geospatial collaborators: geocoding, routing, ETA heuristics, and the
//! device position source.

pub mod eta;
pub mod geocode;
pub mod position;
pub mod routing;
pub mod types;

pub use geocode::{Geocoder, NominatimClient};
pub use position::{NatsPositionSource, PositionSource};
pub use routing::{OrsClient, RouteOrchestrator, RouteService};
pub use types::{GeoPoint, PositionFix, RoutePlan, RouteSummary, TravelMode};
