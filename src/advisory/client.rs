//! Ollama generation client
//!
//! One non-streaming `POST /api/generate` per question:
//! - request: `{ "model", "prompt", "stream": false }`
//! - reply: JSON object whose `response` field holds the full text
//!
//! Single attempt, no retry. Every request is bounded by a timeout.

use crate::advisory::Advisor;
use crate::errors::{RiskError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Default request timeout; local generation on CPU can be slow
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for the reachability probe
const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for a local Ollama server
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    client: Client,
    base_url: String,
    model: String,
}

impl AdvisoryClient {
    /// Create client with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RiskError::Advisory(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Send one prompt and return the generated text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::info!(model = %self.model, prompt_chars = prompt.len(), "sending advisory request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RiskError::Advisory(format!("Request to {} timed out", url))
                } else {
                    RiskError::Advisory(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RiskError::Advisory(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            tracing::warn!(%status, "advisory endpoint returned an error");
            return Err(RiskError::Advisory(format!("HTTP {}: {}", status, body.trim())));
        }

        let text = parse_generate_response(&body)?;
        tracing::debug!(reply_chars = text.len(), "advisory reply received");
        Ok(text)
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// List models installed on the server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| RiskError::Advisory(format!("Failed to list models: {}", e)))?;

        if !response.status().is_success() {
            return Err(RiskError::Advisory(format!(
                "Failed to list models: HTTP {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| RiskError::Advisory(format!("Failed to parse models: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Advisor for AdvisoryClient {
    async fn ask(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Ollama generate response; only the fields we read
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagInfo>,
}

#[derive(Debug, Deserialize)]
struct TagInfo {
    name: String,
}

/// Extract the generated text from a response body
pub fn parse_generate_response(body: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| RiskError::Advisory(format!("Invalid JSON from endpoint: {}", e)))?;

    match (parsed.response, parsed.error) {
        (Some(text), _) => Ok(text),
        (None, Some(error)) => Err(RiskError::Advisory(format!("Model error: {}", error))),
        (None, None) => Err(RiskError::Advisory(
            "Response is missing the 'response' field".to_string(),
        )),
    }
}
