//! Free-text analysis of loaded responses by an external LLM service
//!
//! A thin request/response pass-through: build a prompt, send it, hand back
//! the text. No retries and no streaming.

pub mod client;
pub mod config;
pub mod prompt;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::AnthropicClient;
pub use config::AnalysisConfig;
pub use prompt::{build_analysis_prompt, SAMPLE_SIZE};
pub use session::{AnalysisSession, AnalysisState};

/// Errors talking to the analysis service
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Failed to serialize data sample: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of one analysis request, as shown in the side panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub content: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Anything that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}
