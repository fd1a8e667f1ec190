//! Continuous speech capture: the supervised loop that turns recognizer
//! events into dispatched commands.

mod listener;
mod transcript;

pub use listener::{LoopState, SpeechCaptureLoop};
pub use transcript::{RecognizerError, TranscriptEvent};
