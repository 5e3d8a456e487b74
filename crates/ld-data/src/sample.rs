//! Synthetic response datasets for trying the dashboard without a file

use chrono::{DateTime, Duration, FixedOffset};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use ld_core::{EvaluationMetrics, ResponseError, ResponseRecord, ResponseStatus};

/// Model name with its typical latency (ms) and price per 1K tokens (USD)
const MODELS: [(&str, f64, f64); 4] = [
    ("gpt-4", 2400.0, 0.03),
    ("gpt-3.5-turbo", 900.0, 0.002),
    ("claude-3-sonnet", 1800.0, 0.015),
    ("claude-3-haiku", 600.0, 0.00025),
];

const TEMPLATES: [&str; 4] = ["summarize", "classify", "extract_entities", "answer_question"];

/// Deterministic generator of plausible response logs
pub struct SampleGenerator {
    rng: StdRng,
    start: DateTime<FixedOffset>,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        let start = DateTime::parse_from_rfc3339("2024-01-15T09:00:00Z")
            .unwrap_or_else(|_| DateTime::<FixedOffset>::default());
        Self {
            rng: StdRng::seed_from_u64(seed),
            start,
        }
    }

    /// Generate `count` records with increasing timestamps
    pub fn generate(&mut self, count: usize) -> Vec<ResponseRecord> {
        let mut timestamp = self.start;
        let mut records = Vec::with_capacity(count);

        for index in 0..count {
            timestamp += Duration::seconds(self.rng.gen_range(5..90));
            records.push(self.record(index, timestamp));
        }

        records
    }

    fn record(&mut self, index: usize, timestamp: DateTime<FixedOffset>) -> ResponseRecord {
        let (model, base_latency, price_per_1k) = MODELS[self.rng.gen_range(0..MODELS.len())];

        let roll: f64 = self.rng.gen();
        let status = if roll < 0.85 {
            ResponseStatus::Success
        } else if roll < 0.95 {
            ResponseStatus::Error
        } else {
            ResponseStatus::Timeout
        };

        let prompt_tokens = self.rng.gen_range(40..800u64);
        let completion_tokens = status
            .is_success()
            .then(|| self.rng.gen_range(20..1200u64));
        let total_tokens = prompt_tokens + completion_tokens.unwrap_or(0);

        let mut response_time_ms = base_latency * self.rng.gen_range(0.5..1.6);
        if status == ResponseStatus::Timeout {
            response_time_ms = 30_000.0;
        } else if self.rng.gen_bool(0.03) {
            // Occasional slow outlier
            response_time_ms *= self.rng.gen_range(4.0..8.0);
        }

        let mut record = ResponseRecord::new(
            format!("resp_{:04}_{:08x}", index, self.rng.gen::<u32>()),
            timestamp,
            model,
            response_time_ms.round(),
            status,
        );
        record.prompt_tokens = prompt_tokens;
        record.completion_tokens = completion_tokens;
        record.total_tokens = Some(total_tokens);
        record.cost_usd = (total_tokens as f64 / 1000.0 * price_per_1k * 1e6).round() / 1e6;
        record.temperature = Some([0.0, 0.3, 0.7, 1.0][self.rng.gen_range(0..4)]);
        record.max_tokens = Some(2048);
        record.prompt_template = Some(TEMPLATES[self.rng.gen_range(0..TEMPLATES.len())].to_string());

        match status {
            ResponseStatus::Success => {
                record.output = Some(format!("Generated output for request {index}"));
                record.evaluation_metrics = Some(EvaluationMetrics {
                    relevance_score: self.score(),
                    factual_accuracy: self.score(),
                    coherence_score: self.score(),
                    response_quality: self.score(),
                });
            }
            ResponseStatus::Error => {
                record.error = Some(ResponseError {
                    error_type: "rate_limit_exceeded".to_string(),
                    message: "Rate limit exceeded, retry after backoff".to_string(),
                });
            }
            ResponseStatus::Timeout => {
                record.error = Some(ResponseError {
                    error_type: "timeout".to_string(),
                    message: "Request exceeded 30s deadline".to_string(),
                });
            }
        }

        record
    }

    fn score(&mut self) -> f64 {
        (self.rng.gen_range(0.6..1.0_f64) * 100.0).round() / 100.0
    }
}

/// Wrap records in the `{ "responses": [...] }` upload format
pub fn sample_document(records: &[ResponseRecord]) -> Result<Value, serde_json::Error> {
    Ok(json!({ "responses": serde_json::to_value(records)? }))
}
