//! Session continuity: the per-session fact store and the journey watch
//! that lives inside it.

mod journey;
mod state;

pub use journey::JourneyTracker;
pub use state::{shared_session, JourneyHandle, SessionSnapshot, SessionState, SharedSession};
