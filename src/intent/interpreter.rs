use crate::config::LlmConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompt::build_prompt;
use super::schema::Intent;

/// Translates one transcript into a structured command via the local
/// inference endpoint.
///
/// `interpret` never fails: every transport, extraction, or validation
/// problem collapses into the `error` intent. No retries are attempted.
pub struct IntentInterpreter {
    client: reqwest::Client,
    cfg: LlmConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions<'a> {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
    stop: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl IntentInterpreter {
    pub fn new(cfg: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .context("Failed to build LLM HTTP client")?;
        Ok(Self { client, cfg })
    }

    pub async fn interpret(&self, transcript: &str) -> Intent {
        match self.generate(transcript).await {
            Ok(intent) => intent,
            Err(err) => {
                warn!("intent interpretation failed: {err:#}");
                Intent::Error {
                    message: Some("failed to interpret command".to_string()),
                }
            }
        }
    }

    async fn generate(&self, transcript: &str) -> Result<Intent> {
        let request = GenerateRequest {
            model: &self.cfg.model,
            prompt: format!(
                "Respond with valid JSON only:\n{}\nJSON:",
                build_prompt(transcript)
            ),
            stream: false,
            options: GenerateOptions {
                temperature: self.cfg.temperature,
                top_p: self.cfg.top_p,
                num_predict: self.cfg.num_predict,
                stop: ["\n\n"],
            },
        };

        let response = self
            .client
            .post(&self.cfg.url)
            .json(&request)
            .send()
            .await
            .context("inference endpoint unreachable")?;

        let status = response.status();
        if !status.is_success() {
            bail!("inference endpoint answered {status}");
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("inference response was not JSON")?;

        let content = body.response.unwrap_or_default().trim().to_string();
        if content.is_empty() {
            bail!("empty model response");
        }
        debug!("model output: {content}");

        let raw = extract_json_object(&content)
            .context("no balanced JSON object in model response")?;
        let value: Value = serde_json::from_str(raw).context("extracted object is not JSON")?;
        Ok(Intent::from_value(value))
    }
}

/// First balanced `{...}` substring of `text`.
///
/// The model wraps its JSON in prose often enough that strict whole-string
/// parsing is useless; this scans with brace depth and string awareness so
/// braces inside JSON strings do not confuse the match.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_prose() {
        let text = "Sure! Here you go: { \"command\": \"zoom\", \"action\": \"in\" } hope that helps";
        assert_eq!(
            extract_json_object(text),
            Some("{ \"command\": \"zoom\", \"action\": \"in\" }")
        );
    }

    #[test]
    fn extracts_first_of_multiple_objects() {
        let text = "{\"command\":\"check_traffic\"} {\"command\":\"show_traffic\"}";
        assert_eq!(extract_json_object(text), Some("{\"command\":\"check_traffic\"}"));
    }

    #[test]
    fn handles_nested_objects_and_braces_in_strings() {
        let text = r#"note {"command":"get_weather","location":"{odd} place","extra":{"a":1}} tail"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"command":"get_weather","location":"{odd} place","extra":{"a":1}}"#)
        );
    }

    #[test]
    fn none_when_no_object_or_unbalanced() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("{\"command\": \"zoom\""), None);
    }
}
