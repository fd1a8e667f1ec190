use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::signals::BroadcastSignal;
use super::subjects;

/// Outbound feedback surface of the engine.
///
/// All three operations are fire-and-forget: delivery failures are logged and
/// swallowed so a flaky presentation side can never fail a command.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Spoken feedback. A newer utterance supersedes a queued one on the
    /// synthesizer side.
    async fn speak(&self, message: &str);

    /// Short human-readable status line.
    async fn set_status(&self, text: &str);

    /// Publish one typed broadcast signal.
    async fn emit(&self, signal: BroadcastSignal);
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    text: &'a str,
}

/// NATS-backed notification bridge.
///
/// Keeps the latest status line so the HTTP status endpoint can serve it
/// without a round trip.
pub struct NatsBridge {
    client: async_nats::Client,
    status: Arc<RwLock<String>>,
}

impl NatsBridge {
    pub fn new(client: async_nats::Client) -> Self {
        Self {
            client,
            status: Arc::new(RwLock::new(String::new())),
        }
    }

    /// Latest status line published through `set_status`.
    pub async fn status_line(&self) -> String {
        self.status.read().await.clone()
    }

    async fn publish_json<T: Serialize>(&self, subject: String, payload: &T) {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to serialize payload for {subject}: {err}");
                return;
            }
        };
        if let Err(err) = self.client.publish(subject.clone(), bytes.into()).await {
            warn!("failed to publish to {subject}: {err}");
        }
    }
}

#[async_trait::async_trait]
impl Notifier for NatsBridge {
    async fn speak(&self, message: &str) {
        debug!("speak: {message}");
        self.publish_json(subjects::SPEECH_SAY.to_string(), &SpeechRequest { message })
            .await;
    }

    async fn set_status(&self, text: &str) {
        {
            let mut status = self.status.write().await;
            text.clone_into(&mut status);
        }
        self.publish_json(subjects::UI_STATUS.to_string(), &StatusUpdate { text })
            .await;
    }

    async fn emit(&self, signal: BroadcastSignal) {
        let subject = subjects::signal(signal.topic());
        debug!("emit {subject}");
        self.publish_json(subject, &signal.payload()).await;
    }
}
