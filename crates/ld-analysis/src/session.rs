//! Request lifecycle for the analysis panel
//!
//! One request in flight is tracked at a time. A newer request, or a
//! [`AnalysisSession::clear_response`], supersedes an older one so a late
//! reply never overwrites what the user is looking at.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ld_core::ResponseRecord;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{build_analysis_prompt, AnalysisError, AnalysisResponse, TextGenerator};

pub const NO_DATA_MESSAGE: &str = "No data provided for analysis";
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisState {
    pub is_loading: bool,
    pub response: Option<AnalysisResponse>,
    pub error: Option<String>,
}

enum Backend {
    Ready(Arc<dyn TextGenerator>),
    Unavailable(String),
}

pub struct AnalysisSession {
    backend: Backend,
    state: RwLock<AnalysisState>,
    latest_request: AtomicU64,
}

impl AnalysisSession {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_backend(Backend::Ready(generator))
    }

    /// A session whose every request fails with `reason`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_backend(Backend::Unavailable(reason.into()))
    }

    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            state: RwLock::new(AnalysisState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    pub fn snapshot(&self) -> AnalysisState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// Ask for insights on a sample of `records`
    pub async fn analyze_data(&self, records: &[ResponseRecord]) -> Option<AnalysisResponse> {
        if records.is_empty() {
            self.state.write().error = Some(NO_DATA_MESSAGE.to_string());
            return None;
        }

        match build_analysis_prompt(records) {
            Ok(prompt) => {
                info!("Requesting analysis of {} records", records.len());
                self.run(&prompt, "Analysis failed").await
            }
            Err(e) => {
                let request = self.begin();
                self.finish(request, Err(AnalysisError::from(e)), "Analysis failed")
            }
        }
    }

    /// Send a free-form prompt
    pub async fn send_prompt(&self, prompt: &str) -> Option<AnalysisResponse> {
        if prompt.trim().is_empty() {
            self.state.write().error = Some(EMPTY_PROMPT_MESSAGE.to_string());
            return None;
        }
        self.run(prompt, "Request failed").await
    }

    /// Drop the current response and error; an in-flight reply is discarded
    pub fn clear_response(&self) {
        self.latest_request.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write();
        state.response = None;
        state.error = None;
        state.is_loading = false;
    }

    async fn run(&self, prompt: &str, fallback: &str) -> Option<AnalysisResponse> {
        let request = self.begin();

        let result = match &self.backend {
            Backend::Ready(generator) => generator.generate(prompt).await,
            Backend::Unavailable(reason) => Err(AnalysisError::Config(reason.clone())),
        };

        self.finish(request, result, fallback)
    }

    fn begin(&self) -> u64 {
        let request = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write();
        state.is_loading = true;
        state.error = None;
        state.response = None;
        request
    }

    /// Apply a finished request; `None` when it was superseded
    fn finish(
        &self,
        request: u64,
        result: Result<String, AnalysisError>,
        fallback: &str,
    ) -> Option<AnalysisResponse> {
        let response = match result {
            Ok(content) => AnalysisResponse::ok(content),
            Err(e) => {
                warn!("Analysis request failed: {}", e);
                let message = e.to_string();
                AnalysisResponse::failed(if message.is_empty() { fallback.to_string() } else { message })
            }
        };

        let mut state = self.state.write();
        if self.latest_request.load(Ordering::SeqCst) != request {
            return None;
        }
        state.is_loading = false;
        state.error = response.error.clone();
        state.response = Some(response.clone());
        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use ld_core::ResponseStatus;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
            self.prompts.lock().push(prompt.to_string());
            if self.fail {
                Err(AnalysisError::Api {
                    status: 500,
                    body: "overloaded".to_string(),
                })
            } else {
                Ok(format!("echo: {}", prompt.len()))
            }
        }
    }

    fn records(count: usize) -> Vec<ResponseRecord> {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        (0..count)
            .map(|i| ResponseRecord::new(format!("r{i}"), ts, "m", 10.0, ResponseStatus::Success))
            .collect()
    }

    #[tokio::test]
    async fn empty_dataset_is_refused_without_a_request() {
        let generator = Arc::new(Recording::default());
        let session = AnalysisSession::new(generator.clone());

        assert_eq!(session.analyze_data(&[]).await, None);
        assert_eq!(session.snapshot().error.as_deref(), Some(NO_DATA_MESSAGE));
        assert!(generator.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn blank_prompt_is_refused() {
        let generator = Arc::new(Recording::default());
        let session = AnalysisSession::new(generator.clone());

        assert_eq!(session.send_prompt("   ").await, None);
        assert_eq!(session.snapshot().error.as_deref(), Some(EMPTY_PROMPT_MESSAGE));
        assert!(generator.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn successful_analysis_is_stored() {
        let generator = Arc::new(Recording::default());
        let session = AnalysisSession::new(generator.clone());

        let response = session.analyze_data(&records(12)).await.unwrap();
        assert!(response.success);

        let state = session.snapshot();
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        assert_eq!(state.response, Some(response));
        assert!(generator.prompts.lock()[0].contains("(Showing first 10 of 12 total entries)"));
    }

    #[tokio::test]
    async fn failures_become_unsuccessful_responses() {
        let generator = Arc::new(Recording {
            fail: true,
            ..Default::default()
        });
        let session = AnalysisSession::new(generator);

        let response = session.send_prompt("why so slow?").await.unwrap();
        assert!(!response.success);
        assert!(response.content.is_empty());

        let state = session.snapshot();
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("API returned error: 500 - overloaded"));
    }

    #[tokio::test]
    async fn unavailable_session_reports_reason() {
        let session = AnalysisSession::unavailable("ANTHROPIC_API_KEY environment variable not set");
        assert!(!session.is_available());

        let response = session.send_prompt("hello").await.unwrap();
        assert!(response.error.unwrap().contains("ANTHROPIC_API_KEY"));
    }

    #[tokio::test]
    async fn clear_resets_response_and_error() {
        let session = AnalysisSession::new(Arc::new(Recording::default()));
        session.send_prompt("hello").await;
        assert!(session.snapshot().response.is_some());

        session.clear_response();
        assert_eq!(session.snapshot(), AnalysisState::default());
    }

    #[test]
    fn superseded_reply_is_discarded() {
        let session = AnalysisSession::new(Arc::new(Recording::default()));

        let first = session.begin();
        let second = session.begin();

        assert_eq!(session.finish(first, Ok("stale".to_string()), "x"), None);
        assert!(session.is_loading());

        let applied = session.finish(second, Ok("fresh".to_string()), "x").unwrap();
        assert_eq!(applied.content, "fresh");
        assert_eq!(session.snapshot().response.unwrap().content, "fresh");
    }
}
