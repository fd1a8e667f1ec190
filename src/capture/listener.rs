use crate::bridge::{subjects, Notifier};
use crate::dispatch::CommandDispatcher;
use crate::intent::IntentInterpreter;
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::transcript::{RecognizerError, TranscriptEvent};

/// Capture loop lifecycle, exposed on the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Listening,
    Processing,
    Restarting,
}

/// The continuous speech-to-text loop.
///
/// Owns the recognizer subscription and feeds finalized transcripts through
/// the interpreter into the dispatcher, one at a time, in arrival order.
/// Activation is a single-use gate: the first `start` wins, later calls are
/// rejected. Stopping is explicit: the stop flag is checked before every
/// restart, so cancellation is a first-class operation rather than an
/// accident of scope.
pub struct SpeechCaptureLoop {
    client: async_nats::Client,
    interpreter: Arc<IntentInterpreter>,
    dispatcher: Arc<CommandDispatcher>,
    bridge: Arc<dyn Notifier>,
    started: AtomicBool,
    stop: AtomicBool,
    state: RwLock<LoopState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SpeechCaptureLoop {
    pub fn new(
        client: async_nats::Client,
        interpreter: Arc<IntentInterpreter>,
        dispatcher: Arc<CommandDispatcher>,
        bridge: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            interpreter,
            dispatcher,
            bridge,
            started: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            state: RwLock::new(LoopState::Idle),
            task: Mutex::new(None),
        })
    }

    /// Activate the loop. Returns false if it was already activated; the
    /// gate never re-arms within one session.
    pub async fn start(self: &Arc<Self>) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(err) = this.run().await {
                error!("capture loop terminated: {err:#}");
            }
        });
        *self.task.lock().await = Some(handle);
        true
    }

    /// Request a stop. The loop exits before its next restart.
    pub async fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        info!("capture loop stop requested");
    }

    pub async fn state(&self) -> LoopState {
        *self.state.read().await
    }

    async fn set_state(&self, state: LoopState) {
        *self.state.write().await = state;
    }

    async fn run(&self) -> Result<()> {
        let mut subscriber = self
            .client
            .subscribe(subjects::STT_WILDCARD.to_string())
            .await
            .context("Failed to subscribe to recognizer subjects")?;

        self.set_state(LoopState::Listening).await;
        self.bridge.set_status("Listening...").await;
        info!("capture loop listening");

        // Only the first finalized result per recognition cycle is acted on.
        let mut handled_cycle: Option<u64> = None;

        while let Some(message) = subscriber.next().await {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let subject: &str = &message.subject;
            match subject {
                subjects::STT_TRANSCRIPT => {
                    let event: TranscriptEvent = match serde_json::from_slice(&message.payload) {
                        Ok(event) => event,
                        Err(err) => {
                            warn!("bad transcript payload: {err}");
                            continue;
                        }
                    };
                    self.handle_transcript(event, &mut handled_cycle).await;
                }
                subjects::STT_ENDED => {
                    // Stop flag is checked before every restart.
                    if self.stop.load(Ordering::SeqCst) {
                        break;
                    }
                    self.set_state(LoopState::Restarting).await;
                    debug!("recognition cycle ended, restarting listener");
                    self.set_state(LoopState::Listening).await;
                    self.bridge.set_status("Listening...").await;
                }
                subjects::STT_ERROR => {
                    let report: RecognizerError = serde_json::from_slice(&message.payload)
                        .unwrap_or(RecognizerError {
                            message: "unknown recognizer error".to_string(),
                        });
                    warn!("recognizer error: {}", report.message);
                    self.bridge
                        .set_status(&format!("Voice error: {}", report.message))
                        .await;
                }
                other => debug!("ignoring unexpected subject {other}"),
            }
        }

        self.set_state(LoopState::Idle).await;
        self.bridge.set_status("Voice control stopped").await;
        info!("capture loop stopped");
        Ok(())
    }

    async fn handle_transcript(&self, event: TranscriptEvent, handled_cycle: &mut Option<u64>) {
        if !accepts(&event, *handled_cycle) {
            // Interim results still reach the status display.
            if !event.is_final {
                self.bridge.set_status(event.text.trim()).await;
            }
            return;
        }
        *handled_cycle = Some(event.cycle);

        let text = event.text.trim().to_string();
        self.bridge.set_status(&format!("Heard: {text}")).await;

        self.set_state(LoopState::Processing).await;
        self.bridge.set_status("Thinking...").await;

        let intent = self.interpreter.interpret(&text).await;
        self.dispatcher.dispatch(intent).await;

        self.set_state(LoopState::Listening).await;
    }
}

/// Forwarding decision for one recognizer result: final, at least two
/// characters, and the first final of its cycle.
fn accepts(event: &TranscriptEvent, handled_cycle: Option<u64>) -> bool {
    if !event.is_final {
        return false;
    }
    if handled_cycle == Some(event.cycle) {
        return false;
    }
    event.text.trim().chars().count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str, is_final: bool, cycle: u64) -> TranscriptEvent {
        TranscriptEvent {
            text: text.to_string(),
            is_final,
            cycle,
            sequence: 0,
            timestamp: String::new(),
        }
    }

    #[test]
    fn interim_results_are_never_forwarded() {
        assert!(!accepts(&event("navigate to Mumbai", false, 1), None));
    }

    #[test]
    fn short_finals_are_dropped() {
        assert!(!accepts(&event("a", true, 1), None));
        assert!(!accepts(&event("  x  ", true, 1), None));
        assert!(accepts(&event("go", true, 1), None));
    }

    #[test]
    fn only_first_final_per_cycle_is_forwarded() {
        let first = event("zoom in", true, 3);
        assert!(accepts(&first, None));
        // A buffered second final in the same cycle is ignored...
        assert!(!accepts(&event("zoom in please", true, 3), Some(3)));
        // ...but the next cycle is fresh.
        assert!(accepts(&event("zoom out", true, 4), Some(3)));
    }
}
