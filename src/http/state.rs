use crate::bridge::NatsBridge;
use crate::capture::SpeechCaptureLoop;
use crate::dispatch::CommandDispatcher;
use crate::intent::IntentInterpreter;
use crate::session::SharedSession;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub capture: Arc<SpeechCaptureLoop>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub interpreter: Arc<IntentInterpreter>,
    pub session: SharedSession,
    pub bridge: Arc<NatsBridge>,
}
