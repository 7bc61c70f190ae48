// cellbench CLI - flatten spreadsheets into prompt artifacts and benchmark
// an inference endpoint against them

mod bench;
mod exit_codes;
mod flatten;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cellbench_config::{resolve_endpoint, BenchConfig, ConfigError};
use cellbench_inference::InferenceError;
use cellbench_io::{ArtifactError, ArtifactFormat, FlattenError};

use bench::{BenchError, EndpointArgs};
use exit_codes::{
    EXIT_ENDPOINT_MALFORMED, EXIT_ENDPOINT_NETWORK, EXIT_ENDPOINT_STATUS, EXIT_ERROR,
    EXIT_FILE_ACCESS, EXIT_SHEET_NOT_FOUND, EXIT_SUCCESS, EXIT_USAGE,
};
use flatten::FlattenArgs;

#[derive(Parser)]
#[command(name = "cellbench")]
#[command(about = "Flatten spreadsheets into prompt artifacts and benchmark LLM answers against them")]
#[command(version, long_version = env!("CELLBENCH_LONG_VERSION"))]
struct Cli {
    /// Config file (default: ./cellbench.toml, then the user config dir)
    #[arg(long, global = true, env = "CELLBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the non-empty cells of one sheet to an artifact file
    #[command(after_help = "\
Examples:
  cellbench flatten MSFT_model.xlsx --sheet MSFT-Model
  cellbench flatten model.xlsx --format legacy -o output.txt
  cellbench flatten model.xlsx --rows 205 -o - | head -c 200")]
    Flatten {
        /// Workbook (xlsx, xlsm, xls, xlsb, ods); defaults to [workbook] path
        workbook: Option<PathBuf>,

        /// Sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Artifact file, or - for stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Artifact format: json or legacy
        #[arg(long, short = 'f')]
        format: Option<ArtifactFormat>,

        /// Last row to include (1-based)
        #[arg(long)]
        rows: Option<usize>,

        /// Number of columns to include starting at A (max 52, through AZ)
        #[arg(long)]
        cols: Option<usize>,

        /// Suppress the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// List sheet names in a workbook
    Sheets {
        /// Workbook; defaults to [workbook] path
        workbook: Option<PathBuf>,
    },

    /// Ask every configured question about the artifact, one request each
    #[command(after_help = "\
Stops at the first failed request. Exit code 60 means the endpoint answered \
with a non-200 status.

Examples:
  cellbench run
  cellbench run --artifact output.txt --model llama3:8b
  cellbench run --jsonl > results.jsonl")]
    Run {
        /// Artifact file; defaults to [artifact] path
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Endpoint base URL (overrides config and CELLBENCH_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Model identifier (overrides config and CELLBENCH_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Maximum output tokens
        #[arg(long)]
        num_predict: Option<u32>,

        /// One JSON object per question instead of the text report
        #[arg(long)]
        jsonl: bool,
    },

    /// Send a fixed prompt to the endpoint and print the raw results
    Ping {
        /// Prompt text
        #[arg(default_value = "hello")]
        prompt: String,

        /// Number of requests
        #[arg(long, short = 'n', default_value_t = 2)]
        count: usize,

        #[arg(long)]
        endpoint: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        num_predict: Option<u32>,
    },

    /// Write a commented config template
    Init {
        /// Destination
        #[arg(default_value = "cellbench.toml")]
        path: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<FlattenError> for CliError {
    fn from(err: FlattenError) -> Self {
        let (code, hint) = match &err {
            FlattenError::FileNotFound(_) | FlattenError::Open(_) | FlattenError::Read { .. } => {
                (EXIT_FILE_ACCESS, None)
            }
            FlattenError::SheetNotFound { .. } => {
                (EXIT_SHEET_NOT_FOUND, Some("list sheets with `cellbench sheets <workbook>`".to_string()))
            }
            FlattenError::NoSheets => (EXIT_SHEET_NOT_FOUND, None),
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<ArtifactError> for CliError {
    fn from(err: ArtifactError) -> Self {
        let code = match &err {
            ArtifactError::NotFound(_) | ArtifactError::Io(_) => EXIT_FILE_ACCESS,
            ArtifactError::InvalidRows | ArtifactError::UnsupportedColumns(_) => EXIT_USAGE,
            ArtifactError::Parse(_) => EXIT_ERROR,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::Io { .. } => EXIT_FILE_ACCESS,
            ConfigError::NotFound(_) | ConfigError::Parse { .. } | ConfigError::Invalid(_) => EXIT_USAGE,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

impl From<InferenceError> for CliError {
    fn from(err: InferenceError) -> Self {
        let (code, hint) = match &err {
            InferenceError::Endpoint { .. } => (EXIT_ENDPOINT_STATUS, None),
            InferenceError::Network(_) => (
                EXIT_ENDPOINT_NETWORK,
                Some("is the inference server running? check [endpoint] url or CELLBENCH_ENDPOINT".to_string()),
            ),
            InferenceError::Malformed(_) => (EXIT_ENDPOINT_MALFORMED, None),
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<BenchError> for CliError {
    fn from(err: BenchError) -> Self {
        match err {
            BenchError::Inference { index, question, source } => {
                let inner = CliError::from(source);
                Self {
                    code: inner.code,
                    message: format!("question {} ({:?}): {}", index + 1, question, inner.message),
                    hint: inner.hint,
                }
            }
            BenchError::Output(e) => CliError::general(format!("failed to write report: {}", e)),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BenchConfig, CliError> {
    BenchConfig::discover(path)
        .map(|loaded| loaded.config)
        .map_err(CliError::from)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Flatten { workbook, sheet, output, format, rows, cols, quiet } => {
            load_config(config_path).and_then(|config| {
                flatten::cmd_flatten(
                    &config,
                    FlattenArgs { workbook, sheet, output, format, rows, cols, quiet },
                )
            })
        }
        Commands::Sheets { workbook } => {
            load_config(config_path).and_then(|config| flatten::cmd_sheets(&config, workbook))
        }
        Commands::Run { artifact, endpoint, model, num_predict, jsonl } => {
            load_config(config_path).and_then(|config| {
                bench::cmd_run(&config, artifact, EndpointArgs { endpoint, model, num_predict }, jsonl)
            })
        }
        Commands::Ping { prompt, count, endpoint, model, num_predict } => {
            load_config(config_path).and_then(|config| {
                bench::cmd_ping(&config, prompt, count, EndpointArgs { endpoint, model, num_predict })
            })
        }
        Commands::Init { path } => cmd_init(&path),
        Commands::Config => cmd_config(config_path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// init / config
// ============================================================================

fn cmd_init(path: &Path) -> Result<(), CliError> {
    BenchConfig::write_template(path).map_err(CliError::from)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

fn cmd_config(path: Option<&Path>) -> Result<(), CliError> {
    let loaded = BenchConfig::discover(path).map_err(CliError::from)?;
    let resolved = resolve_endpoint(&loaded.config.endpoint);
    let toml = loaded.config.to_toml_string().map_err(CliError::from)?;

    let source = loaded
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let write = |handle: &mut std::io::StdoutLock<'_>, line: String| {
        writeln!(handle, "{}", line).map_err(|e| CliError::general(e.to_string()))
    };
    write(&mut handle, format!("# source:   {}", source))?;
    write(&mut handle, format!("# endpoint: {} ({})", resolved.url, resolved.url_source.as_str()))?;
    write(&mut handle, format!("# model:    {} ({})", resolved.model, resolved.model_source.as_str()))?;
    write(&mut handle, String::new())?;
    write(&mut handle, toml)?;
    Ok(())
}
