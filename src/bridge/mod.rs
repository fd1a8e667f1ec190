//! Notification bridge: spoken feedback, the status line, and typed broadcast
//! signals for presentation collaborators, all over NATS.

pub mod nats;
pub mod signals;
pub mod subjects;

pub use nats::{NatsBridge, Notifier};
pub use signals::{BroadcastSignal, MapRoute, MapViewUpdate, WeatherCard, ZoomStep};
