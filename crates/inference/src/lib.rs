//! Inference endpoint client.
//!
//! This crate owns the generate wire contract: request body, sampling
//! options, and the success/error classification of responses.
//!
//! No streaming. No retries. One blocking request per prompt.

mod client;
mod generate;

pub use client::{GenerateClient, InferenceBackend, InferenceError};
pub use generate::{parse_completion, Completion, GenerateRequest, SamplingOptions};
