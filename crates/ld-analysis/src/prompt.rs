//! Prompt templating

use ld_core::ResponseRecord;

/// How many records are embedded in the analysis prompt
pub const SAMPLE_SIZE: usize = 10;

/// Build the analysis prompt from the first [`SAMPLE_SIZE`] records
pub fn build_analysis_prompt(records: &[ResponseRecord]) -> Result<String, serde_json::Error> {
    let sample = &records[..records.len().min(SAMPLE_SIZE)];
    let sample_json = serde_json::to_string_pretty(sample)?;

    let note = if records.len() > SAMPLE_SIZE {
        format!("\n\n(Showing first {} of {} total entries)", SAMPLE_SIZE, records.len())
    } else {
        String::new()
    };

    Ok(format!(
        "Analyze this LLM response data and provide insights about performance patterns, anomalies, or recommendations:

Data: {sample_json}{note}

Please provide:
1. Key performance insights
2. Any anomalies or patterns you notice
3. Recommendations for optimization

Keep the response concise and actionable."
    ))
}
