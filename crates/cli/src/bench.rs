//! Benchmark runner: one inference call per question against a prompt artifact.
//!
//! Questions run strictly in order. The first failure stops the run; no
//! later question is sent.

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use cellbench_config::{resolve_endpoint, BenchConfig, BenchmarkSettings};
use cellbench_inference::{Completion, GenerateClient, InferenceBackend, InferenceError, SamplingOptions};
use cellbench_io::read_artifact;

use crate::CliError;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Question header, pretty JSON with `time_taken`, expected answer
    Text,
    /// One JSON object per question
    JsonLines,
}

/// Outcome of one question.
#[derive(Debug, Clone)]
pub struct QuestionResult {
    pub index: usize,
    pub question: String,
    pub completion: Completion,
    pub elapsed: Duration,
    pub expected: Option<String>,
}

impl QuestionResult {
    /// The endpoint's response object with `time_taken` (seconds) added.
    pub fn timed_response(&self) -> serde_json::Value {
        let mut raw = self.completion.raw.clone();
        if let Some(obj) = raw.as_object_mut() {
            obj.insert("time_taken".into(), serde_json::json!(self.elapsed.as_secs_f64()));
        }
        raw
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub questions: usize,
    pub total: Duration,
}

impl RunSummary {
    pub fn mean(&self) -> Duration {
        if self.questions == 0 {
            Duration::ZERO
        } else {
            self.total / self.questions as u32
        }
    }
}

#[derive(Debug)]
pub enum BenchError {
    /// Inference failed on the question at `index` (0-based)
    Inference { index: usize, question: String, source: InferenceError },
    /// Writing the report failed
    Output(std::io::Error),
}

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchError::Inference { index, question, source } => {
                write!(f, "question {} ({:?}) failed: {}", index + 1, question, source)
            }
            BenchError::Output(e) => write!(f, "failed to write report: {}", e),
        }
    }
}

impl std::error::Error for BenchError {}

/// Prompt text: artifact, optional instruction, question, joined by newlines.
pub fn build_prompt(artifact: &str, instruction: Option<&str>, question: &str) -> String {
    let mut parts = vec![artifact];
    if let Some(instruction) = instruction {
        parts.push(instruction);
    }
    parts.push(question);
    parts.join("\n")
}

/// Ask every configured question in order, writing each result as it arrives.
pub fn run_benchmark<B: InferenceBackend, W: Write>(
    backend: &B,
    artifact: &str,
    settings: &BenchmarkSettings,
    options: &SamplingOptions,
    style: ReportStyle,
    out: &mut W,
) -> Result<RunSummary, BenchError> {
    let mut summary = RunSummary::default();
    let count = settings.questions.len();

    for (index, question) in settings.questions.iter().enumerate() {
        let prompt = build_prompt(artifact, settings.instruction.as_deref(), question);
        log::info!("[{}/{}] submitting {} prompt bytes", index + 1, count, prompt.len());

        let start = Instant::now();
        let completion = backend
            .submit(&prompt, options)
            .map_err(|source| BenchError::Inference {
                index,
                question: question.clone(),
                source,
            })?;
        let elapsed = start.elapsed();

        let result = QuestionResult {
            index,
            question: question.clone(),
            completion,
            elapsed,
            expected: settings.expected_for(index).map(String::from),
        };
        write_result(&result, count, style, out).map_err(BenchError::Output)?;

        summary.questions += 1;
        summary.total += elapsed;
    }

    if style == ReportStyle::Text && summary.questions > 0 {
        writeln!(
            out,
            "\nCompleted {} questions in {:.2}s (mean {:.2}s)",
            summary.questions,
            summary.total.as_secs_f64(),
            summary.mean().as_secs_f64()
        )
        .map_err(BenchError::Output)?;
    }

    Ok(summary)
}

fn write_result<W: Write>(
    result: &QuestionResult,
    count: usize,
    style: ReportStyle,
    out: &mut W,
) -> std::io::Result<()> {
    match style {
        ReportStyle::Text => {
            writeln!(out, "[{}/{}] {}", result.index + 1, count, result.question)?;
            let pretty = serde_json::to_string_pretty(&result.timed_response())
                .map_err(std::io::Error::other)?;
            writeln!(out, "{}", pretty)?;
            if let Some(expected) = &result.expected {
                writeln!(out, "Answer:   {}", result.completion.response.trim())?;
                writeln!(out, "Expected: {}", expected)?;
            }
            writeln!(out)
        }
        ReportStyle::JsonLines => {
            let line = serde_json::json!({
                "index": result.index + 1,
                "question": result.question,
                "response": result.completion.response,
                "time_taken": result.elapsed.as_secs_f64(),
                "expected": result.expected,
                "raw": result.completion.raw,
            });
            writeln!(out, "{}", line)
        }
    }
}

/// Options shared by `run` and `ping`
pub struct EndpointArgs {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub num_predict: Option<u32>,
}

fn connect(
    config: &BenchConfig,
    args: &EndpointArgs,
) -> Result<(GenerateClient, SamplingOptions), CliError> {
    let resolved = resolve_endpoint(&config.endpoint)
        .with_flags(args.endpoint.clone(), args.model.clone());
    log::info!(
        "endpoint {} ({}), model {} ({})",
        resolved.url,
        resolved.url_source.as_str(),
        resolved.model,
        resolved.model_source.as_str()
    );

    let client = GenerateClient::new(&resolved.url, &resolved.model, resolved.timeout)
        .map_err(CliError::from)?;

    let mut options = config.sampling;
    if let Some(n) = args.num_predict {
        options.num_predict = n;
    }
    Ok((client, options))
}

// ============================================================================
// run
// ============================================================================

pub fn cmd_run(
    config: &BenchConfig,
    artifact_path: Option<PathBuf>,
    endpoint: EndpointArgs,
    jsonl: bool,
) -> Result<(), CliError> {
    if config.benchmark.questions.is_empty() {
        return Err(CliError::args("no questions configured")
            .with_hint("add [benchmark] questions to cellbench.toml (see `cellbench init`)"));
    }

    let artifact_path = artifact_path.unwrap_or_else(|| config.artifact.path.clone());
    let artifact = read_artifact(&artifact_path).map_err(|e| {
        CliError::from(e).with_hint("run `cellbench flatten` to produce the artifact")
    })?;

    let (client, options) = connect(config, &endpoint)?;
    let style = if jsonl { ReportStyle::JsonLines } else { ReportStyle::Text };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_benchmark(&client, &artifact, &config.benchmark, &options, style, &mut handle)
        .map_err(CliError::from)?;
    Ok(())
}

// ============================================================================
// ping
// ============================================================================

/// Send a fixed prompt `count` times and print each raw result.
pub fn cmd_ping(
    config: &BenchConfig,
    prompt: String,
    count: usize,
    endpoint: EndpointArgs,
) -> Result<(), CliError> {
    let (client, options) = connect(config, &endpoint)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for _ in 0..count {
        let completion = client.submit(&prompt, &options).map_err(CliError::from)?;
        let pretty = serde_json::to_string_pretty(&completion.raw)
            .map_err(|e| CliError::general(e.to_string()))?;
        writeln!(handle, "{}", pretty).map_err(|e| CliError::general(e.to_string()))?;
    }
    Ok(())
}
