// Inference collaborator.
//
// The service never generates text itself: an external engine maps a
// prompt to a finished completion, invoked at most once per request with
// no retry. The trait is the injection seam; the reqwest-backed client
// is the production implementation.

use async_trait::async_trait;
use serde::Deserialize;

/// Errors from the inference call.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(String),

    #[error("inference request timed out: {0}")]
    Timeout(String),

    #[error("inference backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("inference response malformed: {0}")]
    Malformed(String),
}

/// Maps a prompt to a complete response string.
///
/// Implementations must be Send + Sync so they can be shared across
/// request handlers via `Arc`.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError>;
}

// ---------------------------------------------------------------------------
// HTTP-backed engine client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// Calls a remote generation endpoint: `{"prompt": ...}` out,
/// `{"text": ...}` back.
pub struct HttpInferenceEngine {
    client: reqwest::Client,
    url: String,
    timeout: std::time::Duration,
}

impl HttpInferenceEngine {
    pub fn new(client: reqwest::Client, url: String, timeout_ms: u64) -> Self {
        Self {
            client,
            url,
            timeout: std::time::Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl InferenceEngine for HttpInferenceEngine {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(e.to_string())
                } else {
                    InferenceError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        Ok(generated.text)
    }
}
