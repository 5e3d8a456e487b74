//! Dataset summary statistics

use chrono::{DateTime, FixedOffset};

use crate::record::{ResponseRecord, ResponseStatus};

/// Response times above `mean + ANOMALY_SIGMA * std_dev` count as anomalies
pub const ANOMALY_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub total_responses: usize,
    pub models: Vec<String>,
    pub statuses: Vec<ResponseStatus>,
    pub date_range: Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>,
    pub response_time: Option<ResponseTimeStats>,
    pub total_cost_usd: f64,
    pub total_tokens: u64,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseTimeStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl ResponseTimeStats {
    /// Population statistics; `None` for an empty input
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    pub fn anomaly_threshold(&self) -> f64 {
        self.mean + ANOMALY_SIGMA * self.std_dev
    }
}

impl DatasetStats {
    pub fn compute(records: &[ResponseRecord]) -> Self {
        let mut models: Vec<String> = Vec::new();
        let mut statuses: Vec<ResponseStatus> = Vec::new();

        // First-seen order
        for record in records {
            if !models.iter().any(|m| m == &record.model) {
                models.push(record.model.clone());
            }
            if !statuses.contains(&record.status) {
                statuses.push(record.status);
            }
        }

        let date_range = records
            .iter()
            .map(|r| r.timestamp)
            .min()
            .zip(records.iter().map(|r| r.timestamp).max());

        let response_times: Vec<f64> = records.iter().map(|r| r.response_time_ms).collect();

        let success_rate = if records.is_empty() {
            None
        } else {
            let successes = records.iter().filter(|r| r.status.is_success()).count();
            Some(successes as f64 / records.len() as f64)
        };

        Self {
            total_responses: records.len(),
            models,
            statuses,
            date_range,
            response_time: ResponseTimeStats::compute(&response_times),
            total_cost_usd: records.iter().map(|r| r.cost_usd).sum(),
            total_tokens: records.iter().map(ResponseRecord::total_tokens_or_zero).sum(),
            success_rate,
        }
    }
}

/// IDs of responses slower than `mean + 2 * std_dev`, in input order
pub fn detect_anomalies(records: &[ResponseRecord]) -> Vec<String> {
    let response_times: Vec<f64> = records.iter().map(|r| r.response_time_ms).collect();
    let Some(stats) = ResponseTimeStats::compute(&response_times) else {
        return Vec::new();
    };

    let threshold = stats.anomaly_threshold();
    records
        .iter()
        .filter(|r| r.response_time_ms > threshold)
        .map(|r| r.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, ts: &str, ms: f64, status: ResponseStatus, model: &str) -> ResponseRecord {
        let timestamp = DateTime::parse_from_rfc3339(ts).unwrap();
        ResponseRecord::new(id, timestamp, model, ms, status)
    }

    #[test]
    fn anomalies_exceed_two_sigma() {
        let mut records: Vec<ResponseRecord> = (0..10)
            .map(|i| record(&format!("r{i}"), "2024-01-01T00:00:00Z", 100.0, ResponseStatus::Success, "m"))
            .collect();
        records.push(record("slow", "2024-01-01T00:00:00Z", 5000.0, ResponseStatus::Timeout, "m"));

        assert_eq!(detect_anomalies(&records), vec!["slow".to_string()]);
    }

    #[test]
    fn uniform_times_have_no_anomalies() {
        let records = vec![
            record("a", "2024-01-01T00:00:00Z", 100.0, ResponseStatus::Success, "m"),
            record("b", "2024-01-01T00:00:01Z", 100.0, ResponseStatus::Success, "m"),
        ];
        assert!(detect_anomalies(&records).is_empty());
        assert!(detect_anomalies(&[]).is_empty());
    }

    #[test]
    fn stats_summarize_dataset() {
        let records = vec![
            record("a", "2024-01-01T00:00:05Z", 100.0, ResponseStatus::Success, "gpt-4").with_cost(0.5),
            record("b", "2024-01-01T00:00:01Z", 300.0, ResponseStatus::Error, "claude").with_tokens(Some(7)),
            record("c", "2024-01-01T00:00:09Z", 200.0, ResponseStatus::Success, "gpt-4"),
        ];

        let stats = DatasetStats::compute(&records);
        assert_eq!(stats.total_responses, 3);
        assert_eq!(stats.models, vec!["gpt-4".to_string(), "claude".to_string()]);
        assert_eq!(stats.statuses, vec![ResponseStatus::Success, ResponseStatus::Error]);
        assert_eq!(stats.total_tokens, 7);
        assert_eq!(stats.total_cost_usd, 0.5);

        let (start, end) = stats.date_range.unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:01+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-01T00:00:09+00:00");

        let times = stats.response_time.unwrap();
        assert_eq!(times.mean, 200.0);
        assert_eq!(times.min, 100.0);
        assert_eq!(times.max, 300.0);
        assert!((stats.success_rate.unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_dataset_stats() {
        let stats = DatasetStats::compute(&[]);
        assert_eq!(stats.total_responses, 0);
        assert!(stats.date_range.is_none());
        assert!(stats.response_time.is_none());
        assert!(stats.success_rate.is_none());
    }
}
