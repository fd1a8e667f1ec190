use crate::bridge::WeatherCard;
use crate::config::WeatherConfig;
use crate::error::DispatchError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Weather lookups through the weather collaborator.
#[async_trait::async_trait]
pub trait WeatherPort: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, DispatchError>;
}

/// A successful weather answer: a spoken summary plus the card payload for
/// the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub message: String,
    pub card: WeatherCard,
}

#[derive(Debug, Deserialize)]
struct WeatherEnvelope {
    message: String,
    data: WeatherCard,
}

pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(cfg: WeatherConfig) -> anyhow::Result<Self> {
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
impl WeatherPort for WeatherClient {
    async fn fetch(&self, location: &str) -> Result<WeatherReport, DispatchError> {
        let url = format!("{}/get-weather", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({ "location": location }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DispatchError::Lookup(location.to_string()));
        }
        if !status.is_success() {
            return Err(DispatchError::Network(format!(
                "weather collaborator answered {status}"
            )));
        }

        let envelope: WeatherEnvelope = response.json().await?;
        Ok(WeatherReport {
            message: envelope.message,
            card: envelope.data,
        })
    }
}
