//! Prompt artifacts: the serialized text form of a [`CellMap`].
//!
//! Two formats are supported:
//!
//! - `legacy`: `{'A1':'42', 'B2':'Revenue'}`. Pairs are single-quoted and
//!   separated by `, ` with no escaping. A value containing `'` or `,`
//!   corrupts the text; that is a property of the format and is left as is.
//! - `json`: a JSON object with the same keys in the same order and string
//!   values, escaped by serde_json.
//!
//! Ordering is row-major over [`ScanBounds`]: rows ascending from 1, and
//! within a row columns ascending from `A`. Cells outside the bounds are
//! counted but never written.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cell::{scan_column_label, CellMap, MAX_SCAN_COLS};

/// Error type for artifact encoding, decoding and file access.
#[derive(Debug)]
pub enum ArtifactError {
    /// Artifact file does not exist
    NotFound(PathBuf),
    /// File I/O error
    Io(String),
    /// Text is not a well-formed artifact of the requested format
    Parse(String),
    /// Row bound of zero
    InvalidRows,
    /// Column bound outside 1..=52
    UnsupportedColumns(usize),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactError::NotFound(path) => write!(f, "artifact not found: {}", path.display()),
            ArtifactError::Io(msg) => write!(f, "I/O error: {}", msg),
            ArtifactError::Parse(msg) => write!(f, "malformed artifact: {}", msg),
            ArtifactError::InvalidRows => write!(f, "row bound must be at least 1"),
            ArtifactError::UnsupportedColumns(cols) => write!(
                f,
                "column bound {} is not supported (scan covers 1..={} columns, A through AZ)",
                cols, MAX_SCAN_COLS
            ),
        }
    }
}

impl std::error::Error for ArtifactError {}

/// Artifact text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Brace/quote/comma pairs, unescaped
    Legacy,
    /// Ordered JSON object
    #[default]
    Json,
}

impl ArtifactFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFormat::Legacy => "legacy",
            ArtifactFormat::Json => "json",
        }
    }
}

impl FromStr for ArtifactFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(ArtifactFormat::Legacy),
            "json" => Ok(ArtifactFormat::Json),
            other => Err(format!("unknown artifact format '{}' (expected legacy or json)", other)),
        }
    }
}

/// Address range covered by the artifact scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanBounds {
    /// Last row, 1-based and inclusive
    rows: usize,
    /// Number of columns starting at A
    cols: usize,
}

impl Default for ScanBounds {
    fn default() -> Self {
        Self { rows: 55, cols: MAX_SCAN_COLS }
    }
}

impl ScanBounds {
    pub fn new(rows: usize, cols: usize) -> Result<Self, ArtifactError> {
        if rows == 0 {
            return Err(ArtifactError::InvalidRows);
        }
        if cols == 0 || cols > MAX_SCAN_COLS {
            return Err(ArtifactError::UnsupportedColumns(cols));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Coordinates in scan order: row-major, then column.
    pub fn coordinates(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.rows).flat_map(move |row| {
            (0..self.cols).filter_map(move |col| {
                scan_column_label(col).map(|label| format!("{}{}", label, row))
            })
        })
    }
}

/// Serialized cell map plus counts for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub text: String,
    pub format: ArtifactFormat,
    /// Entries written
    pub included: usize,
    /// Non-empty cells outside the scan bounds
    pub skipped_out_of_bounds: usize,
}

/// Serialize a cell map in scan order.
pub fn serialize(cells: &CellMap, bounds: &ScanBounds, format: ArtifactFormat) -> Artifact {
    let ordered: Vec<(String, String)> = bounds
        .coordinates()
        .filter_map(|coord| cells.get(&coord).map(|v| (coord, v.to_string())))
        .collect();

    let text = match format {
        ArtifactFormat::Legacy => encode_legacy(&ordered),
        ArtifactFormat::Json => encode_json(&ordered),
    };

    let skipped = cells.len() - ordered.len();
    if skipped > 0 {
        log::warn!(
            "{} non-empty cells lie outside rows 1..={} / {} columns and were not serialized",
            skipped,
            bounds.rows,
            bounds.cols
        );
    }

    Artifact {
        text,
        format,
        included: ordered.len(),
        skipped_out_of_bounds: skipped,
    }
}

fn encode_legacy(pairs: &[(String, String)]) -> String {
    let mut out = String::from("{");
    for (i, (coord, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "'{}':'{}'", coord, value);
    }
    out.push('}');
    out
}

fn encode_json(pairs: &[(String, String)]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Parse artifact text back into ordered `(coordinate, value)` pairs.
pub fn parse_artifact(text: &str, format: ArtifactFormat) -> Result<Vec<(String, String)>, ArtifactError> {
    match format {
        ArtifactFormat::Legacy => parse_legacy(text),
        ArtifactFormat::Json => parse_json(text),
    }
}

fn parse_json(text: &str) -> Result<Vec<(String, String)>, ArtifactError> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(text).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    map.into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => Ok((k, s)),
            other => Err(ArtifactError::Parse(format!("value for {} is not a string: {}", k, other))),
        })
        .collect()
}

fn parse_legacy(text: &str) -> Result<Vec<(String, String)>, ArtifactError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| ArtifactError::Parse("expected text wrapped in braces".into()))?;

    let mut pairs = Vec::new();
    let mut rest = inner.trim_start();
    while !rest.is_empty() {
        let (coord, after) = quoted(rest)?;
        let after = after
            .strip_prefix(':')
            .ok_or_else(|| ArtifactError::Parse(format!("expected ':' after '{}'", coord)))?;
        let (value, after) = quoted(after)?;
        pairs.push((coord.to_string(), value.to_string()));

        rest = match after.strip_prefix(',') {
            Some(next) => next.trim_start(),
            None if after.trim().is_empty() => "",
            None => {
                return Err(ArtifactError::Parse(format!(
                    "unexpected text after value for {}",
                    coord
                )))
            }
        };
    }
    Ok(pairs)
}

/// Split `'body'rest` into `(body, rest)`.
fn quoted(s: &str) -> Result<(&str, &str), ArtifactError> {
    let body = s
        .strip_prefix('\'')
        .ok_or_else(|| ArtifactError::Parse("expected opening quote".into()))?;
    let end = body
        .find('\'')
        .ok_or_else(|| ArtifactError::Parse("unterminated quote".into()))?;
    Ok((&body[..end], &body[end + 1..]))
}

/// Write artifact text to a file (no header, no trailing newline).
pub fn write_artifact(path: &Path, artifact: &Artifact) -> Result<(), ArtifactError> {
    std::fs::write(path, &artifact.text)
        .map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))
}

/// Read artifact text from a file.
pub fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound(path.to_path_buf())
        } else {
            ArtifactError::Io(format!("{}: {}", path.display(), e))
        }
    })
}
