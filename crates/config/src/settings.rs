// Benchmark settings
// Loaded from --config, ./cellbench.toml or ~/.config/cellbench/config.toml

use std::fs;
use std::path::{Path, PathBuf};

use cellbench_inference::SamplingOptions;
use cellbench_io::{ArtifactFormat, ScanBounds};
use serde::{Deserialize, Serialize};

/// Commented template written by `cellbench init`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("default_config.toml");

/// Config file name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "cellbench.toml";

/// Error type for configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// Explicitly requested file does not exist
    NotFound(PathBuf),
    /// File exists but could not be read or written
    Io { path: PathBuf, message: String },
    /// TOML syntax or type error
    Parse { path: PathBuf, message: String },
    /// Values parsed but are not usable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "config file not found: {}", path.display()),
            ConfigError::Io { path, message } => write!(f, "{}: {}", path.display(), message),
            ConfigError::Parse { path, message } => {
                write!(f, "error parsing {}: {}", path.display(), message)
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Workbook to flatten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkbookSettings {
    pub path: Option<PathBuf>,
    /// Sheet name; None = first sheet
    pub sheet: Option<String>,
    /// Last row scanned, 1-based inclusive
    pub rows: usize,
    /// Columns scanned starting at A
    pub cols: usize,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            path: None,
            sheet: None,
            rows: 55,
            cols: 52,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactSettings {
    pub path: PathBuf,
    pub format: ArtifactFormat,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output.txt"),
            format: ArtifactFormat::Json,
        }
    }
}

/// Inference endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointSettings {
    /// Server root; `/api/generate` is appended
    pub url: String,
    pub model: String,
    /// None = transport default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:32b".to_string(),
            timeout_secs: None,
        }
    }
}

/// Questions and their hand-labeled answers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkSettings {
    /// Inserted between the artifact and each question
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    pub questions: Vec<String>,
    /// Matched to `questions` by position
    pub expected_answers: Vec<String>,
}

impl BenchmarkSettings {
    /// Expected answer for the question at `index`, if one is labeled.
    pub fn expected_for(&self, index: usize) -> Option<&str> {
        self.expected_answers
            .get(index)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub workbook: WorkbookSettings,
    pub artifact: ArtifactSettings,
    pub endpoint: EndpointSettings,
    pub sampling: SamplingOptions,
    pub benchmark: BenchmarkSettings,
}

/// A config together with the file it came from (None = built-in defaults).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BenchConfig,
    pub source: Option<PathBuf>,
}

impl BenchConfig {
    /// User-level config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("cellbench").join("config.toml"))
    }

    /// Parse TOML text. `origin` is only used in error messages.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config to use.
    ///
    /// An explicit path must exist. Otherwise `./cellbench.toml`, then the user
    /// config file, then built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        if let Some(path) = explicit {
            return Ok(LoadedConfig {
                config: Self::load(path)?,
                source: Some(path.to_path_buf()),
            });
        }

        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(Self::user_config_path());
        for candidate in candidates {
            if candidate.is_file() {
                log::info!("using config {}", candidate.display());
                return Ok(LoadedConfig {
                    config: Self::load(&candidate)?,
                    source: Some(candidate),
                });
            }
        }

        log::info!("no config file found, using defaults");
        Ok(LoadedConfig {
            config: Self::default(),
            source: None,
        })
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan_bounds()?;

        if self.endpoint.url.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint.url is empty".into()));
        }
        if self.endpoint.model.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint.model is empty".into()));
        }
        if self.benchmark.expected_answers.len() > self.benchmark.questions.len() {
            return Err(ConfigError::Invalid(format!(
                "benchmark.expected_answers has {} entries but there are only {} questions",
                self.benchmark.expected_answers.len(),
                self.benchmark.questions.len()
            )));
        }
        Ok(())
    }

    /// Scan bounds from `[workbook]`.
    pub fn scan_bounds(&self) -> Result<ScanBounds, ConfigError> {
        ScanBounds::new(self.workbook.rows, self.workbook.cols)
            .map_err(|e| ConfigError::Invalid(format!("workbook bounds: {}", e)))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Write the commented template. Refuses to overwrite an existing file.
    pub fn write_template(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                message: "file already exists".into(),
            });
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
