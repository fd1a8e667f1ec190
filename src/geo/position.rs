use crate::bridge::subjects;
use crate::error::DispatchError;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::types::PositionFix;

/// Access to the device position.
///
/// `current` is a one-shot query; `watch` is the continuous subscription used
/// by journey tracking. The two are deliberately separate: a denied one-shot
/// must not disturb an active watch and vice versa.
#[async_trait::async_trait]
pub trait PositionSource: Send + Sync {
    async fn current(&self) -> Result<PositionFix, DispatchError>;

    /// Continuous position updates. The subscription is released when the
    /// returned receiver is dropped.
    async fn watch(&self) -> Result<mpsc::Receiver<PositionFix>, DispatchError>;
}

/// Position source backed by the device gateway on NATS.
///
/// One-shot queries are request/reply on `geo.position.query`; the watch
/// subscribes to `geo.position.stream`.
pub struct NatsPositionSource {
    client: async_nats::Client,
    query_timeout: Duration,
}

impl NatsPositionSource {
    pub fn new(client: async_nats::Client, query_timeout: Duration) -> Self {
        Self {
            client,
            query_timeout,
        }
    }
}

#[async_trait::async_trait]
impl PositionSource for NatsPositionSource {
    async fn current(&self) -> Result<PositionFix, DispatchError> {
        let request = self
            .client
            .request(subjects::POSITION_QUERY.to_string(), "".into());

        let reply = tokio::time::timeout(self.query_timeout, request)
            .await
            .map_err(|_| DispatchError::Permission("position query timed out".to_string()))?
            .map_err(|err| DispatchError::Permission(format!("position query failed: {err}")))?;

        serde_json::from_slice(&reply.payload)
            .map_err(|err| DispatchError::Permission(format!("bad position payload: {err}")))
    }

    async fn watch(&self) -> Result<mpsc::Receiver<PositionFix>, DispatchError> {
        let mut subscriber = self
            .client
            .subscribe(subjects::POSITION_STREAM.to_string())
            .await
            .map_err(|err| {
                DispatchError::Permission(format!("position stream unavailable: {err}"))
            })?;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            while let Some(message) = subscriber.next().await {
                let fix: PositionFix = match serde_json::from_slice(&message.payload) {
                    Ok(fix) => fix,
                    Err(err) => {
                        warn!("bad position payload: {err}");
                        continue;
                    }
                };
                if tx.send(fix).await.is_err() {
                    // Watch consumer is gone; dropping the subscriber
                    // unsubscribes.
                    break;
                }
            }
            debug!("position watch forwarding task stopped");
        });

        Ok(rx)
    }
}
