use serde::{Deserialize, Serialize};

/// One recognizer result, interim or final.
///
/// `cycle` identifies the recognition cycle the result belongs to; `sequence`
/// is the arrival order across the whole stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub text: String,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub cycle: u64,
    pub sequence: u64,
    #[serde(default)]
    pub timestamp: String,
}

/// Recognizer-side failure report. Never fatal to the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerError {
    pub message: String,
}
