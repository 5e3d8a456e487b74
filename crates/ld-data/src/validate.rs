//! Validation of uploaded JSON into response records
//!
//! Validation is all-or-nothing: the first bad record rejects the whole
//! document and nothing is returned for the records that did pass.

use ahash::AHashSet;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use ld_core::{EvaluationMetrics, ResponseError, ResponseRecord, ResponseStatus};

use crate::DataError;

/// Why a parsed JSON document was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Top level is neither an array nor an object with a `responses` array
    #[error("Invalid data format: Expected \"responses\" array")]
    MalformedContainer,

    /// A record is missing a required field or has a field of the wrong type
    #[error("Invalid response data format for {} (field `{field}`)", describe_record(.index, .id))]
    InvalidRecord {
        index: usize,
        id: Option<String>,
        field: &'static str,
    },

    #[error("Duplicate response ID: {id} (record {index})")]
    DuplicateId { index: usize, id: String },
}

fn describe_record(index: &usize, id: &Option<String>) -> String {
    match id {
        Some(id) => format!("ID: {id}"),
        None => format!("record {index}"),
    }
}

impl ValidationError {
    /// The offending record's id, when it had a usable one
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::MalformedContainer => None,
            Self::InvalidRecord { id, .. } => id.as_deref(),
            Self::DuplicateId { id, .. } => Some(id),
        }
    }
}

/// Parse JSON text and validate it
pub fn parse_records(text: &str) -> Result<Vec<ResponseRecord>, DataError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(validate(&value)?)
}

/// Validate a parsed document into records
pub fn validate(raw: &Value) -> Result<Vec<ResponseRecord>, ValidationError> {
    let items = container_items(raw)?;

    let mut seen = AHashSet::with_capacity(items.len());
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let record = validate_record(index, item)?;
        if !seen.insert(record.id.clone()) {
            return Err(ValidationError::DuplicateId { index, id: record.id });
        }
        records.push(record);
    }

    Ok(records)
}

fn container_items(raw: &Value) -> Result<&[Value], ValidationError> {
    match raw {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get("responses") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ValidationError::MalformedContainer),
        },
        _ => Err(ValidationError::MalformedContainer),
    }
}

fn validate_record(index: usize, item: &Value) -> Result<ResponseRecord, ValidationError> {
    let Some(object) = item.as_object() else {
        return Err(ValidationError::InvalidRecord {
            index,
            id: None,
            field: "record",
        });
    };

    let id = match object.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(ValidationError::InvalidRecord {
                index,
                id: None,
                field: "id",
            })
        }
    };

    let fields = RecordFields { index, id, object };

    let timestamp = fields.timestamp("timestamp")?;
    let model = fields.required_str("model")?.to_string();
    let response_time_ms = fields.required_number("response_time_ms")?;
    let total_tokens = fields.nullable_count("total_tokens")?;
    let status = fields.status("status")?;

    Ok(ResponseRecord {
        prompt_tokens: fields.optional_count("prompt_tokens")?.unwrap_or(0),
        completion_tokens: fields.optional_count("completion_tokens")?,
        total_tokens,
        cost_usd: fields.optional_number("cost_usd")?.unwrap_or(0.0),
        temperature: fields.optional_number("temperature")?,
        max_tokens: fields.optional_count("max_tokens")?,
        prompt_template: fields.optional_str("prompt_template")?,
        output: fields.optional_str("output")?,
        evaluation_metrics: fields.evaluation_metrics("evaluation_metrics")?,
        error: fields.error_block("error")?,
        id: fields.id,
        timestamp,
        model,
        response_time_ms,
        status,
    })
}

/// Typed field access for one record, producing errors that name the field
struct RecordFields<'a> {
    index: usize,
    id: String,
    object: &'a Map<String, Value>,
}

impl<'a> RecordFields<'a> {
    fn invalid(&self, field: &'static str) -> ValidationError {
        ValidationError::InvalidRecord {
            index: self.index,
            id: Some(self.id.clone()),
            field,
        }
    }

    /// `None` for absent or null fields
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn required_str(&self, field: &'static str) -> Result<&'a str, ValidationError> {
        self.object
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid(field))
    }

    fn required_number(&self, field: &'static str) -> Result<f64, ValidationError> {
        self.object
            .get(field)
            .and_then(non_negative_number)
            .ok_or_else(|| self.invalid(field))
    }

    fn required_count(&self, field: &'static str) -> Result<u64, ValidationError> {
        self.object
            .get(field)
            .and_then(non_negative_integer)
            .ok_or_else(|| self.invalid(field))
    }

    /// The key must be present; `null` means unknown
    fn nullable_count(&self, field: &'static str) -> Result<Option<u64>, ValidationError> {
        match self.object.get(field) {
            None => Err(self.invalid(field)),
            Some(Value::Null) => Ok(None),
            Some(value) => non_negative_integer(value).map(Some).ok_or_else(|| self.invalid(field)),
        }
    }

    fn timestamp(&self, field: &'static str) -> Result<DateTime<FixedOffset>, ValidationError> {
        let raw = self.required_str(field)?;
        parse_timestamp(raw).ok_or_else(|| self.invalid(field))
    }

    fn status(&self, field: &'static str) -> Result<ResponseStatus, ValidationError> {
        let raw = self.required_str(field)?;
        ResponseStatus::parse(raw).ok_or_else(|| self.invalid(field))
    }

    fn optional_number(&self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        self.present(field)
            .map(|value| non_negative_number(value).ok_or_else(|| self.invalid(field)))
            .transpose()
    }

    fn optional_count(&self, field: &'static str) -> Result<Option<u64>, ValidationError> {
        self.present(field)
            .map(|value| non_negative_integer(value).ok_or_else(|| self.invalid(field)))
            .transpose()
    }

    fn optional_str(&self, field: &'static str) -> Result<Option<String>, ValidationError> {
        self.present(field)
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(field))
            })
            .transpose()
    }

    fn evaluation_metrics(&self, field: &'static str) -> Result<Option<EvaluationMetrics>, ValidationError> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };
        let metrics = value.as_object().ok_or_else(|| self.invalid(field))?;

        let score = |name: &str| {
            metrics
                .get(name)
                .and_then(Value::as_f64)
                .filter(|score| (0.0..=1.0).contains(score))
                .ok_or_else(|| self.invalid(field))
        };

        Ok(Some(EvaluationMetrics {
            relevance_score: score("relevance_score")?,
            factual_accuracy: score("factual_accuracy")?,
            coherence_score: score("coherence_score")?,
            response_quality: score("response_quality")?,
        }))
    }

    fn error_block(&self, field: &'static str) -> Result<Option<ResponseError>, ValidationError> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };
        let block = value.as_object().ok_or_else(|| self.invalid(field))?;

        let text = |name: &str| {
            block
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| self.invalid(field))
        };

        Ok(Some(ResponseError {
            error_type: text("type")?,
            message: text("message")?,
        }))
    }
}

fn non_negative_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite() && *n >= 0.0)
}

fn non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    // Accept integral floats such as `50.0`
    value
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}

/// RFC 3339 first, then the other ISO 8601 shapes log writers commonly emit.
/// Timestamps without an offset, including bare dates, are read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp);
    }

    // Offsets without a colon, e.g. `+0100`
    if let Some(timestamp) = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"]
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(timestamp);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    Some(Utc.from_utc_datetime(&naive).with_timezone(&Utc.fix()))
}
