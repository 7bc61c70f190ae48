// Endpoint resolution
//
// The endpoint URL and model come from, in order of precedence:
// 1. Command-line flags (applied by the caller)
// 2. Environment variables (CELLBENCH_ENDPOINT, CELLBENCH_MODEL)
// 3. The config file
// 4. Built-in defaults

use std::env;
use std::time::Duration;

use crate::settings::EndpointSettings;

pub const ENDPOINT_ENV: &str = "CELLBENCH_ENDPOINT";
pub const MODEL_ENV: &str = "CELLBENCH_MODEL";

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Default,
    ConfigFile,
    Environment,
    Flag,
}

impl ValueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSource::Default => "default",
            ValueSource::ConfigFile => "config",
            ValueSource::Environment => "environment",
            ValueSource::Flag => "flag",
        }
    }
}

/// The effective endpoint after all overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub url_source: ValueSource,
    pub model: String,
    pub model_source: ValueSource,
    pub timeout: Option<Duration>,
}

impl ResolvedEndpoint {
    /// Apply command-line overrides.
    pub fn with_flags(mut self, url: Option<String>, model: Option<String>) -> Self {
        if let Some(url) = url {
            self.url = url;
            self.url_source = ValueSource::Flag;
        }
        if let Some(model) = model {
            self.model = model;
            self.model_source = ValueSource::Flag;
        }
        self
    }
}

/// Resolve against the process environment.
pub fn resolve_endpoint(settings: &EndpointSettings) -> ResolvedEndpoint {
    resolve_endpoint_with(settings, |name| env::var(name).ok())
}

/// Resolve with an explicit variable lookup.
pub fn resolve_endpoint_with(
    settings: &EndpointSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> ResolvedEndpoint {
    let defaults = EndpointSettings::default();

    let file_source = |value: &str, default: &str| {
        if value == default {
            ValueSource::Default
        } else {
            ValueSource::ConfigFile
        }
    };

    let (url, url_source) = match lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
        Some(url) => (url, ValueSource::Environment),
        None => (settings.url.clone(), file_source(&settings.url, &defaults.url)),
    };

    let (model, model_source) = match lookup(MODEL_ENV).filter(|v| !v.is_empty()) {
        Some(model) => (model, ValueSource::Environment),
        None => (settings.model.clone(), file_source(&settings.model, &defaults.model)),
    };

    ResolvedEndpoint {
        url,
        url_source,
        model,
        model_source,
        timeout: settings.timeout_secs.map(Duration::from_secs),
    }
}
