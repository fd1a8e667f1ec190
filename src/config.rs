use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub nats: NatsConfig,
    pub llm: LlmConfig,
    pub geocoding: GeocodingConfig,
    pub routing: RoutingConfig,
    pub weather: WeatherConfig,
    pub messaging: MessagingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    /// One-shot position query timeout.
    pub position_query_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Generate endpoint of the local inference server.
    pub url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub num_predict: u32,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    pub url: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
