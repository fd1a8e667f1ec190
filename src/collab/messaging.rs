use crate::config::MessagingConfig;
use crate::error::DispatchError;
use crate::geo::GeoPoint;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Location sharing through the messaging collaborator.
#[async_trait::async_trait]
pub trait MessagingPort: Send + Sync {
    /// Returns the collaborator's confirmation message on success.
    async fn send_location(
        &self,
        contact: &str,
        position: GeoPoint,
    ) -> Result<String, DispatchError>;
}

#[derive(Debug, Deserialize)]
struct SendReply {
    message: String,
}

pub struct WhatsappClient {
    client: reqwest::Client,
    base_url: String,
}

impl WhatsappClient {
    pub fn new(cfg: MessagingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.url,
        })
    }
}

#[async_trait::async_trait]
impl MessagingPort for WhatsappClient {
    async fn send_location(
        &self,
        contact: &str,
        position: GeoPoint,
    ) -> Result<String, DispatchError> {
        let url = format!("{}/send-whatsapp", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contact": contact,
                "lat": position.lat,
                "lng": position.lng,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DispatchError::Lookup(contact.to_string()));
        }
        if !status.is_success() {
            return Err(DispatchError::Network(format!(
                "messaging collaborator answered {status}"
            )));
        }

        let reply: SendReply = response.json().await?;
        Ok(reply.message)
    }
}
