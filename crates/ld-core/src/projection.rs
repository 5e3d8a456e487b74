//! Chart and table projections of the canonical record array
//!
//! Both projections order records by timestamp with a stable sort, so records
//! sharing a timestamp keep the order they had in the uploaded file.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Locale, Offset, SecondsFormat, Utc};
use serde::Serialize;

use crate::record::{ResponseRecord, ResponseStatus};

/// Locale-aware timestamp formatting for the views
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFormatter {
    locale: Locale,
    offset: FixedOffset,
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self {
            locale: Locale::en_US,
            offset: Utc.fix(),
        }
    }
}

impl TimeFormatter {
    pub fn new(locale: Locale, offset: FixedOffset) -> Self {
        Self { locale, offset }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Hour and minute, used for chart axis ticks
    pub fn axis_label(&self, timestamp: &DateTime<FixedOffset>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format_localized("%H:%M", self.locale)
            .to_string()
    }

    /// Full locale date and time, used for table cells and tooltips
    pub fn display(&self, timestamp: &DateTime<FixedOffset>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format_localized("%x %X", self.locale)
            .to_string()
    }
}

/// A record reshaped for the response time chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "responseTime")]
    pub response_time: f64,
    pub model: String,
    pub status: ResponseStatus,
    pub total_tokens: u64,
    #[serde(rename = "formattedTime")]
    pub formatted_time: String,
    #[serde(rename = "axisLabel")]
    pub axis_label: String,
}

/// A record reshaped for the response table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "responseTime")]
    pub response_time: f64,
    pub model: String,
    pub total_tokens: u64,
    pub status: ResponseStatus,
    #[serde(rename = "formattedTime")]
    pub formatted_time: String,
    pub cost_usd: f64,
}

/// Records ordered by timestamp, ties kept in input order
pub fn sorted_by_timestamp(records: &[ResponseRecord]) -> Vec<&ResponseRecord> {
    let mut sorted: Vec<&ResponseRecord> = records.iter().collect();
    // `sort_by_key` is stable
    sorted.sort_by_key(|record| record.timestamp);
    sorted
}

fn wire_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn to_chart_points(records: &[ResponseRecord], formatter: &TimeFormatter) -> Vec<ChartPoint> {
    sorted_by_timestamp(records)
        .into_iter()
        .map(|record| ChartPoint {
            id: record.id.clone(),
            timestamp: wire_timestamp(&record.timestamp),
            response_time: record.response_time_ms,
            model: record.model.clone(),
            status: record.status,
            total_tokens: record.total_tokens_or_zero(),
            formatted_time: formatter.display(&record.timestamp),
            axis_label: formatter.axis_label(&record.timestamp),
        })
        .collect()
}

pub fn to_table_rows(records: &[ResponseRecord], formatter: &TimeFormatter) -> Vec<TableRow> {
    sorted_by_timestamp(records)
        .into_iter()
        .map(|record| TableRow {
            id: record.id.clone(),
            timestamp: wire_timestamp(&record.timestamp),
            response_time: record.response_time_ms,
            model: record.model.clone(),
            total_tokens: record.total_tokens_or_zero(),
            status: record.status,
            formatted_time: formatter.display(&record.timestamp),
            cost_usd: record.cost_usd,
        })
        .collect()
}

/// Both projections of one dataset version
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    pub chart: Arc<[ChartPoint]>,
    pub table: Arc<[TableRow]>,
}

impl Default for Projections {
    fn default() -> Self {
        Self {
            chart: Arc::from(Vec::new()),
            table: Arc::from(Vec::new()),
        }
    }
}

impl Projections {
    pub fn derive(records: &[ResponseRecord], formatter: &TimeFormatter) -> Self {
        Self {
            chart: to_chart_points(records, formatter).into(),
            table: to_table_rows(records, formatter).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, ts: &str, response_time_ms: f64) -> ResponseRecord {
        let timestamp = DateTime::parse_from_rfc3339(ts).unwrap();
        ResponseRecord::new(id, timestamp, "gpt-4", response_time_ms, ResponseStatus::Success)
            .with_tokens(Some(50))
    }

    #[test]
    fn projections_sort_by_timestamp() {
        let records = vec![
            record("late", "2024-01-01T00:00:10Z", 1.0),
            record("early", "2024-01-01T00:00:01Z", 2.0),
            // 00:00:05Z written with a +01:00 offset
            record("offset", "2024-01-01T01:00:05+01:00", 3.0),
        ];

        let ids: Vec<_> = to_chart_points(&records, &TimeFormatter::default())
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["early", "offset", "late"]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let records = vec![
            record("b", "2024-01-01T00:00:05Z", 1.0),
            record("a", "2024-01-01T00:00:05Z", 2.0),
            record("first", "2024-01-01T00:00:00Z", 3.0),
            record("c", "2024-01-01T00:00:05Z", 4.0),
        ];
        let formatter = TimeFormatter::default();

        let chart_ids: Vec<_> = to_chart_points(&records, &formatter).into_iter().map(|p| p.id).collect();
        let table_ids: Vec<_> = to_table_rows(&records, &formatter).into_iter().map(|r| r.id).collect();

        assert_eq!(chart_ids, vec!["first", "b", "a", "c"]);
        assert_eq!(table_ids, chart_ids);
    }

    #[test]
    fn missing_total_tokens_project_as_zero() {
        let records = vec![record("r1", "2024-01-01T00:00:05Z", 120.0).with_tokens(None)];
        let formatter = TimeFormatter::default();

        assert_eq!(to_chart_points(&records, &formatter)[0].total_tokens, 0);
        assert_eq!(to_table_rows(&records, &formatter)[0].total_tokens, 0);
    }

    #[test]
    fn projection_is_deterministic() {
        let records = vec![
            record("r1", "2024-01-01T00:00:05Z", 120.0),
            record("r2", "2024-01-01T00:00:02Z", 80.0),
        ];
        let formatter = TimeFormatter::default();

        assert_eq!(to_chart_points(&records, &formatter), to_chart_points(&records, &formatter));
        assert_eq!(to_table_rows(&records, &formatter), to_table_rows(&records, &formatter));
    }

    #[test]
    fn table_row_carries_renamed_fields() {
        let records = vec![record("r1", "2024-01-01T00:00:05Z", 120.0).with_cost(0.001)];
        let rows = to_table_rows(&records, &TimeFormatter::default());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].response_time, 120.0);
        assert_eq!(rows[0].total_tokens, 50);
        assert_eq!(rows[0].timestamp, "2024-01-01T00:00:05Z");
        assert!(!rows[0].formatted_time.is_empty());

        let value = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(value["responseTime"], 120.0);
        assert!(value.get("formattedTime").is_some());
    }

    #[test]
    fn formatter_respects_offset() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:30:05Z").unwrap();
        let utc = TimeFormatter::default();
        let plus_two = TimeFormatter::new(Locale::en_US, FixedOffset::east_opt(2 * 3600).unwrap());

        assert_eq!(utc.axis_label(&ts), "00:30");
        assert_eq!(plus_two.axis_label(&ts), "02:30");
        assert!(utc.display(&ts).contains("30:05"));
    }
}
