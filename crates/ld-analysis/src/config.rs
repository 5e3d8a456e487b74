//! Analysis service configuration

use crate::AnalysisError;

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const MODEL_VAR: &str = "ANTHROPIC_MODEL";
pub const MAX_TOKENS_VAR: &str = "ANTHROPIC_MAX_TOKENS";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";

pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Clone)]
pub struct AnalysisConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AnalysisConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Initialize from environment variables, loading `.env` first
    pub fn from_env() -> Result<Self, AnalysisError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AnalysisError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(AnalysisError::MissingApiKey(API_KEY_VAR))?;

        let mut config = Self::new(api_key);

        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(raw) = lookup(MAX_TOKENS_VAR) {
            config.max_tokens = raw
                .trim()
                .parse()
                .map_err(|_| AnalysisError::Config(format!("{MAX_TOKENS_VAR} must be a positive integer, got {raw:?}")))?;
        }
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = AnalysisConfig::from_lookup(lookup(&[(API_KEY_VAR, "sk-test")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = AnalysisConfig::from_lookup(lookup(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingApiKey(API_KEY_VAR)));
    }

    #[test]
    fn overrides_are_read() {
        let config = AnalysisConfig::from_lookup(lookup(&[
            (API_KEY_VAR, "sk-test"),
            (MODEL_VAR, "claude-3-haiku-20240307"),
            (MAX_TOKENS_VAR, "256"),
            (BASE_URL_VAR, "http://localhost:8080/"),
        ]))
        .unwrap();

        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
        assert!(!format!("{config:?}").contains("sk-test"));
    }

    #[test]
    fn bad_max_tokens_is_rejected() {
        let err = AnalysisConfig::from_lookup(lookup(&[(API_KEY_VAR, "k"), (MAX_TOKENS_VAR, "lots")])).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }
}
