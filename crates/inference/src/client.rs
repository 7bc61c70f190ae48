//! Generate-endpoint HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! One POST per prompt. No retries, no streaming.

use std::time::Duration;

use crate::generate::{parse_completion, Completion, GenerateRequest, SamplingOptions};

/// Anything that can answer a prompt.
pub trait InferenceBackend {
    fn submit(&self, prompt: &str, options: &SamplingOptions) -> Result<Completion, InferenceError>;
}

/// Error type for inference calls.
#[derive(Debug)]
pub enum InferenceError {
    /// Client could not be built or the request never completed
    Network(String),
    /// Endpoint answered with a status other than 200
    Endpoint { status: u16, body: String },
    /// 200 response with an unexpected body
    Malformed(String),
}

impl InferenceError {
    /// HTTP status for endpoint errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            InferenceError::Endpoint { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::Network(msg) => write!(f, "Network error: {}", msg),
            InferenceError::Endpoint { status, body } => {
                if body.is_empty() {
                    write!(f, "Request failed with status code {}", status)
                } else {
                    write!(f, "Request failed with status code {}: {}", status, body)
                }
            }
            InferenceError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for InferenceError {}

/// Client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Clone)]
pub struct GenerateClient {
    http: reqwest::blocking::Client,
    generate_url: String,
    model: String,
}

impl GenerateClient {
    /// `base_url` is the server root, e.g. `http://localhost:11434`.
    /// `timeout = None` means no limit; reqwest's 30s blocking default is
    /// overridden either way.
    pub fn new(base_url: &str, model: &str, timeout: Option<Duration>) -> Result<Self, InferenceError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("cellbench/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        Ok(Self {
            http,
            generate_url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    pub fn generate_url(&self) -> &str {
        &self.generate_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl InferenceBackend for GenerateClient {
    fn submit(&self, prompt: &str, options: &SamplingOptions) -> Result<Completion, InferenceError> {
        let request = GenerateRequest::new(&self.model, prompt, options);
        log::debug!(
            "POST {} model={} prompt_bytes={}",
            self.generate_url,
            self.model,
            prompt.len()
        );

        let response = self
            .http
            .post(&self.generate_url)
            .json(&request)
            .send()
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().unwrap_or_default();
            log::warn!("generate returned HTTP {}", status);
            return Err(InferenceError::Endpoint { status, body });
        }

        let body = response
            .text()
            .map_err(|e| InferenceError::Network(e.to_string()))?;
        parse_completion(&body)
    }
}
