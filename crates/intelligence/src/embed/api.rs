//! HTTP embedder for OpenAI-compatible `/embeddings` endpoints
//!
//! Works with Ollama, vLLM, llama.cpp server, OpenAI and other compatible
//! providers.

use crate::llm_client::{endpoint_url, LlmClientError};
use pantry_engine::{check_embedding, EmbedError, Embedder, ModelConfig};

/// Embedder backed by an external embeddings endpoint
#[allow(dead_code)] // url/api_key/timeout used behind #[cfg(feature = "embed")]
pub struct ApiEmbedder {
    /// Full URL to the embeddings endpoint
    url: String,
    /// Model name to request; also the model identity
    model: String,
    /// Optional bearer token
    api_key: Option<String>,
    /// Request timeout
    timeout: std::time::Duration,
    /// Declared vector length
    dimension: usize,
}

impl ApiEmbedder {
    /// Create a new ApiEmbedder.
    ///
    /// `endpoint` should be the base URL (e.g. "http://localhost:11434/v1").
    /// The `/embeddings` path is appended automatically.
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<&str>,
        timeout_ms: u64,
        dimension: usize,
    ) -> Self {
        Self {
            url: endpoint_url(endpoint, "embeddings"),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
            timeout: std::time::Duration::from_millis(timeout_ms),
            dimension,
        }
    }

    /// Build from an `[embedding]` config section
    pub fn from_config(config: &ModelConfig, dimension: usize) -> Self {
        Self::new(
            &config.endpoint,
            &config.model,
            config.api_key.as_deref(),
            config.timeout_ms,
            dimension,
        )
    }

    #[cfg(feature = "embed")]
    fn call_api(&self, text: &str) -> Result<Vec<f32>, LlmClientError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });
        crate::llm_client::call_embeddings(&self.url, self.api_key.as_deref(), self.timeout, &body)
    }

    /// Placeholder for when the `embed` feature is not enabled.
    #[cfg(not(feature = "embed"))]
    fn call_api(&self, _text: &str) -> Result<Vec<f32>, LlmClientError> {
        Err(LlmClientError::FeatureDisabled("embed"))
    }
}

impl From<LlmClientError> for EmbedError {
    fn from(e: LlmClientError) -> Self {
        match e {
            LlmClientError::Parse(msg) => EmbedError::InvalidResponse(msg),
            LlmClientError::FeatureDisabled(_) => EmbedError::Unavailable(e.to_string()),
            other => EmbedError::Request(other.to_string()),
        }
    }
}

impl Embedder for ApiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if cfg!(not(feature = "embed")) {
            return Err(LlmClientError::FeatureDisabled("embed").into());
        }
        crate::llm_client::retry_once(
            || self.call_api(text).map_err(EmbedError::from),
            |vector| {
                check_embedding(&vector, self.dimension)?;
                Ok(vector)
            },
            "embed",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let e = ApiEmbedder::new("http://localhost:11434/v1/", "nomic-embed-text", None, 5000, 768);
        assert_eq!(e.url, "http://localhost:11434/v1/embeddings");
        assert_eq!(e.model_id(), "nomic-embed-text");
        assert_eq!(e.dimension(), 768);
    }

    #[test]
    fn test_from_config() {
        let config = ModelConfig {
            endpoint: "http://example.test/v1".into(),
            model: "m".into(),
            api_key: Some("k".into()),
            timeout_ms: 1000,
        };
        let e = ApiEmbedder::from_config(&config, 4);
        assert_eq!(e.api_key.as_deref(), Some("k"));
        assert_eq!(e.timeout, std::time::Duration::from_millis(1000));
    }

    #[cfg(not(feature = "embed"))]
    #[test]
    fn test_feature_disabled() {
        let e = ApiEmbedder::new("http://localhost:1/v1", "m", None, 10, 4);
        assert!(matches!(e.embed("x"), Err(EmbedError::Unavailable(_))));
    }
}
