// Configuration loading

pub mod endpoint;
pub mod settings;

pub use endpoint::{resolve_endpoint, resolve_endpoint_with, ResolvedEndpoint, ValueSource, ENDPOINT_ENV, MODEL_ENV};
pub use settings::{
    ArtifactSettings, BenchConfig, BenchmarkSettings, ConfigError, EndpointSettings,
    LoadedConfig, WorkbookSettings, DEFAULT_CONFIG_TOML,
};
