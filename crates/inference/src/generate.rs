//! Wire types for the `/api/generate` endpoint.

use serde::{Deserialize, Serialize};

use crate::client::InferenceError;

/// Sampling parameters forwarded verbatim as the request's `options` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub temperature: f64,
    /// Nucleus sampling threshold
    pub top_p: f64,
    pub top_k: u32,
    /// Maximum output length in tokens
    pub num_predict: u32,
    pub repeat_penalty: f64,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            num_predict: 100,
            repeat_penalty: 1.1,
        }
    }
}

/// Request body. Streaming is always off.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: &'a SamplingOptions,
}

impl<'a> GenerateRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, options: &'a SamplingOptions) -> Self {
        Self { model, prompt, stream: false, options }
    }
}

/// A successful generate call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The full non-streamed answer text
    pub response: String,
    /// Whole response object as returned by the endpoint
    pub raw: serde_json::Value,
}

/// Parse a 200 response body. Requires a JSON object with a string `response`.
pub fn parse_completion(body: &str) -> Result<Completion, InferenceError> {
    let raw: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| InferenceError::Malformed(format!("response is not JSON: {}", e)))?;

    let response = raw
        .get("response")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| InferenceError::Malformed("missing 'response' field".into()))?;

    Ok(Completion { response, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let options = SamplingOptions::default();
        let request = GenerateRequest::new("deepseek-r1:32b", "hello", &options);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "deepseek-r1:32b");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.7);
        assert_eq!(json["options"]["top_p"], 0.9);
        assert_eq!(json["options"]["top_k"], 40);
        assert_eq!(json["options"]["num_predict"], 100);
        assert_eq!(json["options"]["repeat_penalty"], 1.1);
    }

    #[test]
    fn test_parse_completion_keeps_raw_object() {
        let completion =
            parse_completion(r#"{"model":"m","response":"The sum is 30.","done":true,"eval_count":12}"#)
                .unwrap();
        assert_eq!(completion.response, "The sum is 30.");
        assert_eq!(completion.raw["eval_count"], 12);
    }

    #[test]
    fn test_parse_completion_missing_field() {
        let err = parse_completion(r#"{"error":"model not loaded"}"#).unwrap_err();
        assert!(matches!(err, InferenceError::Malformed(_)));
    }

    #[test]
    fn test_parse_completion_not_json() {
        let err = parse_completion("<html>bad gateway</html>").unwrap_err();
        assert!(err.to_string().contains("not JSON"));
    }

    #[test]
    fn test_sampling_partial_deserialize() {
        let options: SamplingOptions = serde_json::from_str(r#"{"num_predict": 5000}"#).unwrap();
        assert_eq!(options.num_predict, 5000);
        assert_eq!(options.top_k, 40);
    }
}
