//! Anthropic Messages API client

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::{AnalysisConfig, AnalysisError, TextGenerator};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    config: AnalysisConfig,
    http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Initialize with environment variables
    pub fn from_env() -> Result<Self, AnalysisError> {
        Ok(Self::new(AnalysisConfig::from_env()?))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

/// Pull the first text block out of a Messages API response
pub(crate) fn extract_text(response: &Value) -> Result<String, AnalysisError> {
    response
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        })
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AnalysisError::InvalidResponse("no text content block".to_string()))
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        info!("Sending analysis request");
        debug!("Prompt: {}", prompt);

        let request_body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        let response = self
            .http
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send analysis request: {}", e);
                AnalysisError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        extract_text(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_text_block() {
        let response = json!({
            "content": [
                { "type": "tool_use", "id": "t1" },
                { "type": "text", "text": "Latency is stable." }
            ]
        });
        assert_eq!(extract_text(&response).unwrap(), "Latency is stable.");
    }

    #[test]
    fn missing_text_is_invalid() {
        let response = json!({ "content": [] });
        assert!(matches!(extract_text(&response), Err(AnalysisError::InvalidResponse(_))));
        assert!(extract_text(&json!({})).is_err());
    }
}
