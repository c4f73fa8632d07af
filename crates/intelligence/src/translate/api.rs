//! Plan proposer backed by an OpenAI-compatible chat completions endpoint

use super::parser::extract_json;
use super::{PlanProposer, TranslateError};
use crate::llm_client::endpoint_url;
use pantry_core::SchemaDescriptor;
use pantry_engine::ModelConfig;

/// Proposer that asks a chat model for a plan.
///
/// Works with Ollama, vLLM, llama.cpp server, OpenAI, and other compatible providers.
#[allow(dead_code)] // fields used behind #[cfg(feature = "translate")]
pub struct ApiProposer {
    /// Full URL to the chat completions endpoint
    url: String,
    /// Model name to request
    model: String,
    /// Optional bearer token
    api_key: Option<String>,
    /// Request timeout
    timeout: std::time::Duration,
    /// Sampling temperature (default: 0.0)
    temperature: f32,
    /// Maximum response tokens (default: 400)
    max_tokens: u32,
}

/// Plans should be reproducible, so sampling is greedy by default.
const DEFAULT_TRANSLATE_TEMPERATURE: f32 = 0.0;
/// Default max tokens for a plan.
const DEFAULT_TRANSLATE_MAX_TOKENS: u32 = 400;

impl ApiProposer {
    /// Create a new ApiProposer.
    ///
    /// `endpoint` should be the base URL (e.g. "http://localhost:11434/v1").
    /// The `/chat/completions` path is appended automatically.
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        Self {
            url: endpoint_url(endpoint, "chat/completions"),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: std::time::Duration::from_millis(timeout_ms),
            temperature: DEFAULT_TRANSLATE_TEMPERATURE,
            max_tokens: DEFAULT_TRANSLATE_MAX_TOKENS,
        }
    }

    /// Build from a `[model]` config section
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.model,
            config.api_key.as_deref(),
            config.timeout_ms,
        )
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the maximum response tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Make the HTTP call and return the raw response text.
    #[cfg(feature = "translate")]
    fn call_api(&self, request: &str, schema: &SchemaDescriptor) -> Result<String, TranslateError> {
        use super::prompt::build_messages;

        let body = serde_json::json!({
            "model": self.model,
            "messages": build_messages(request, schema),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        Ok(crate::llm_client::call_chat_completions(
            &self.url,
            self.api_key.as_deref(),
            self.timeout,
            &body,
        )?)
    }

    /// Placeholder for when the `translate` feature is not enabled.
    #[cfg(not(feature = "translate"))]
    fn call_api(
        &self,
        _request: &str,
        _schema: &SchemaDescriptor,
    ) -> Result<String, TranslateError> {
        Err(TranslateError::FeatureDisabled("translate"))
    }
}

impl PlanProposer for ApiProposer {
    fn propose(&self, request: &str, schema: &SchemaDescriptor) -> Result<String, TranslateError> {
        if cfg!(not(feature = "translate")) {
            return Err(TranslateError::FeatureDisabled("translate"));
        }
        crate::llm_client::retry_once(
            || self.call_api(request, schema),
            |text| match extract_json(&text) {
                Some(json) => Ok(json.to_string()),
                None => Err(TranslateError::Parse(
                    "model returned no JSON object".to_string(),
                )),
            },
            "translate",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_proposer_url_construction() {
        let proposer = ApiProposer::new("http://localhost:11434/v1", "qwen3:1.7b", None, 5000);
        assert_eq!(proposer.url, "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_api_proposer_strips_trailing_slash() {
        let proposer = ApiProposer::new("http://localhost:11434/v1/", "qwen3:1.7b", None, 5000);
        assert_eq!(proposer.url, "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_builders() {
        let proposer = ApiProposer::new("http://x/v1", "m", Some("key"), 100)
            .with_temperature(0.3)
            .with_max_tokens(50);
        assert_eq!(proposer.temperature, 0.3);
        assert_eq!(proposer.max_tokens, 50);
        assert_eq!(proposer.api_key.as_deref(), Some("key"));
    }

    #[cfg(not(feature = "translate"))]
    #[test]
    fn test_feature_disabled() {
        let proposer = ApiProposer::new("http://localhost:1/v1", "m", None, 10);
        assert!(matches!(
            proposer.propose("soup", &SchemaDescriptor::default()),
            Err(TranslateError::FeatureDisabled("translate"))
        ));
    }
}
