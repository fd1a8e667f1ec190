//! NATS subject names shared with the device and presentation collaborators.

/// Finalized/interim transcripts from the speech recognizer.
pub const STT_TRANSCRIPT: &str = "stt.transcript";
/// End of one recognition cycle; the capture loop restarts listening.
pub const STT_ENDED: &str = "stt.ended";
/// Recognizer-side failures; reported via status, never fatal.
pub const STT_ERROR: &str = "stt.error";
/// Wildcard covering all recognizer subjects.
pub const STT_WILDCARD: &str = "stt.>";

/// Spoken feedback for the speech synthesizer.
pub const SPEECH_SAY: &str = "speech.say";
/// Short human-readable status line.
pub const UI_STATUS: &str = "ui.status";

/// One-shot position request (request/reply).
pub const POSITION_QUERY: &str = "geo.position.query";
/// Continuous position updates for journey tracking.
pub const POSITION_STREAM: &str = "geo.position.stream";

/// Subject for a broadcast signal topic.
pub fn signal(topic: &str) -> String {
    format!("signal.{topic}")
}
