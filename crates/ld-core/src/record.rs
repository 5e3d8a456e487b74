//! Canonical response record model

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Outcome of a single LLM invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    Timeout,
}

impl ResponseStatus {
    pub const ALL: [ResponseStatus; 3] = [Self::Success, Self::Error, Self::Timeout];

    /// Parse the wire representation (`success`, `error`, `timeout`)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality scores attached to a response, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub relevance_score: f64,
    pub factual_accuracy: f64,
    pub coherence_score: f64,
    pub response_quality: f64,
}

/// Failure details, only populated when the status is not `success`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// One logged LLM invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub model: String,
    #[serde(default)]
    pub prompt_tokens: u64,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
    pub response_time_ms: f64,
    pub status: ResponseStatus,
    #[serde(default)]
    pub cost_usd: f64,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub prompt_template: Option<String>,
    pub output: Option<String>,
    pub evaluation_metrics: Option<EvaluationMetrics>,
    pub error: Option<ResponseError>,
}

impl ResponseRecord {
    /// Create a record with the required fields set and everything optional left empty
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        model: impl Into<String>,
        response_time_ms: f64,
        status: ResponseStatus,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            model: model.into(),
            prompt_tokens: 0,
            completion_tokens: None,
            total_tokens: None,
            response_time_ms,
            status,
            cost_usd: 0.0,
            temperature: None,
            max_tokens: None,
            prompt_template: None,
            output: None,
            evaluation_metrics: None,
            error: None,
        }
    }

    pub fn with_tokens(mut self, total_tokens: Option<u64>) -> Self {
        self.total_tokens = total_tokens;
        self
    }

    pub fn with_cost(mut self, cost_usd: f64) -> Self {
        self.cost_usd = cost_usd;
        self
    }

    /// Total tokens with an absent value counted as zero
    pub fn total_tokens_or_zero(&self) -> u64 {
        self.total_tokens.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in ResponseStatus::ALL {
            assert_eq!(ResponseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ResponseStatus::parse("SUCCESS"), None);
        assert_eq!(ResponseStatus::parse("pending"), None);
    }

    #[test]
    fn record_serializes_error_block_with_type_key() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:05Z").unwrap();
        let mut record = ResponseRecord::new("r1", ts, "m", 10.0, ResponseStatus::Error);
        record.error = Some(ResponseError {
            error_type: "rate_limit".to_string(),
            message: "slow down".to_string(),
        });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"]["type"], "rate_limit");
        assert_eq!(value["status"], "error");
    }
}
