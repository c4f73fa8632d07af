//! Shared HTTP client for OpenAI-compatible model endpoints
//!
//! Used by the plan proposer (`/chat/completions`) and the HTTP embedder
//! (`/embeddings`). Both go through the same error type and retry helper.

use std::fmt;

// ============================================================================
// Unified Error Type
// ============================================================================

/// Errors that can occur when calling an external model endpoint
#[derive(Debug)]
pub enum LlmClientError {
    /// HTTP request failed (network unreachable, connection refused, etc.)
    Network(String),
    /// Failed to parse model response
    Parse(String),
    /// Model request timed out
    Timeout,
    /// Required cargo feature (translate/embed) is not enabled
    FeatureDisabled(&'static str),
}

impl fmt::Display for LlmClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmClientError::Network(msg) => write!(f, "network error: {}", msg),
            LlmClientError::Parse(msg) => write!(f, "parse error: {}", msg),
            LlmClientError::Timeout => write!(f, "model request timed out"),
            LlmClientError::FeatureDisabled(feat) => {
                write!(f, "feature '{}' not enabled", feat)
            }
        }
    }
}

impl std::error::Error for LlmClientError {}

/// Join a base endpoint and a path, dropping any trailing slash on the base
pub fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), path)
}

// ============================================================================
// Shared HTTP Client
// ============================================================================

/// POST a JSON body and return the parsed JSON response.
#[cfg(any(feature = "translate", feature = "embed"))]
fn post_json(
    url: &str,
    api_key: Option<&str>,
    timeout: std::time::Duration,
    body: &serde_json::Value,
) -> Result<(serde_json::Value, String), LlmClientError> {
    let body_bytes = serde_json::to_vec(body)
        .map_err(|e| LlmClientError::Parse(format!("failed to serialize request: {}", e)))?;

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let mut request = agent.post(url).header("Content-Type", "application/json");

    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {}", key));
    }

    let mut response = request.send(&body_bytes[..]).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("timed out") || msg.contains("Timeout") {
            LlmClientError::Timeout
        } else {
            LlmClientError::Network(msg)
        }
    })?;

    let response_text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| LlmClientError::Network(format!("failed to read response: {}", e)))?;

    let json: serde_json::Value = serde_json::from_str(&response_text)
        .map_err(|e| LlmClientError::Parse(format!("invalid JSON response: {}", e)))?;

    Ok((json, response_text))
}

#[cfg(any(feature = "translate", feature = "embed"))]
fn snippet(text: &str) -> &str {
    let mut end = text.len().min(200);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Call an OpenAI-compatible chat completions endpoint and extract
/// `choices[0].message.content`.
#[cfg(feature = "translate")]
pub fn call_chat_completions(
    url: &str,
    api_key: Option<&str>,
    timeout: std::time::Duration,
    body: &serde_json::Value,
) -> Result<String, LlmClientError> {
    let (json, raw) = post_json(url, api_key, timeout, body)?;
    parse_chat_content(&json)
        .map(str::to_string)
        .ok_or_else(|| {
            LlmClientError::Parse(format!("unexpected response format: {}", snippet(&raw)))
        })
}

/// Call an OpenAI-compatible embeddings endpoint and extract
/// `data[0].embedding`.
#[cfg(feature = "embed")]
pub fn call_embeddings(
    url: &str,
    api_key: Option<&str>,
    timeout: std::time::Duration,
    body: &serde_json::Value,
) -> Result<Vec<f32>, LlmClientError> {
    let (json, raw) = post_json(url, api_key, timeout, body)?;
    parse_embedding(&json).ok_or_else(|| {
        LlmClientError::Parse(format!("unexpected response format: {}", snippet(&raw)))
    })
}

/// `choices[0].message.content` of a chat completions response
pub fn parse_chat_content(json: &serde_json::Value) -> Option<&str> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
}

/// `data[0].embedding` of an embeddings response
pub fn parse_embedding(json: &serde_json::Value) -> Option<Vec<f32>> {
    json.get("data")
        .and_then(|d| d.get(0))
        .and_then(|d| d.get("embedding"))
        .and_then(|e| e.as_array())
        .and_then(|values| {
            values
                .iter()
                .map(|v| v.as_f64().map(|x| x as f32))
                .collect::<Option<Vec<f32>>>()
        })
}

// ============================================================================
// Retry Helper
// ============================================================================

/// Execute a model call with a single retry on failure or unusable output.
///
/// 1. Calls `call_fn()` to get the raw response
/// 2. Calls `parse_fn()` to turn it into a result
/// 3. If the call or the parse fails, retries once
/// 4. The second failure is returned as is
///
/// `operation` is a label for tracing messages (e.g. "translate" or "embed").
pub fn retry_once<R, T, E>(
    call_fn: impl Fn() -> Result<R, E>,
    parse_fn: impl Fn(R) -> Result<T, E>,
    operation: &str,
) -> Result<T, E>
where
    E: fmt::Display,
{
    match call_fn().and_then(&parse_fn) {
        Ok(result) => return Ok(result),
        Err(e) => {
            tracing::warn!(
                target: "pantry::llm_client",
                op = operation,
                error = %e,
                "First call failed, retrying"
            );
        }
    }

    call_fn().and_then(&parse_fn).map_err(|e| {
        tracing::warn!(
            target: "pantry::llm_client",
            op = operation,
            error = %e,
            "Retry also failed, giving up"
        );
        e
    })
}
