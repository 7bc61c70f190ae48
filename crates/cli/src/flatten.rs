// flatten / sheets commands

use std::io::Write;
use std::path::{Path, PathBuf};

use cellbench_config::BenchConfig;
use cellbench_io::{flatten_sheet, list_sheets, serialize, write_artifact, ArtifactFormat, ScanBounds};

use crate::CliError;

pub struct FlattenArgs {
    pub workbook: Option<PathBuf>,
    pub sheet: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<ArtifactFormat>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub quiet: bool,
}

fn workbook_path(config: &BenchConfig, explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    explicit
        .or_else(|| config.workbook.path.clone())
        .ok_or_else(|| {
            CliError::args("no workbook given")
                .with_hint("pass a workbook path or set [workbook] path in cellbench.toml")
        })
}

pub fn cmd_flatten(config: &BenchConfig, args: FlattenArgs) -> Result<(), CliError> {
    let workbook = workbook_path(config, args.workbook)?;
    let sheet = args.sheet.or_else(|| config.workbook.sheet.clone());
    let output = args.output.unwrap_or_else(|| config.artifact.path.clone());
    let format = args.format.unwrap_or(config.artifact.format);
    let bounds = ScanBounds::new(
        args.rows.unwrap_or(config.workbook.rows),
        args.cols.unwrap_or(config.workbook.cols),
    )
    .map_err(CliError::from)?;

    let flattened = flatten_sheet(&workbook, sheet.as_deref()).map_err(CliError::from)?;
    let artifact = serialize(&flattened.cells, &bounds, format);

    if output == Path::new("-") {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", artifact.text).map_err(|e| CliError::general(e.to_string()))?;
    } else {
        write_artifact(&output, &artifact).map_err(CliError::from)?;
    }

    if !args.quiet {
        eprintln!(
            "Wrote {} cells from '{}' to {} ({})",
            artifact.included,
            flattened.sheet_name,
            output.display(),
            format.as_str()
        );
        if artifact.skipped_out_of_bounds > 0 {
            eprintln!(
                "note: {} cells outside rows 1-{} / columns A-{} were not included",
                artifact.skipped_out_of_bounds,
                bounds.rows(),
                cellbench_io::col_to_letter(bounds.cols() - 1)
            );
        }
    }
    Ok(())
}

pub fn cmd_sheets(config: &BenchConfig, workbook: Option<PathBuf>) -> Result<(), CliError> {
    let workbook = workbook_path(config, workbook)?;
    let names = list_sheets(&workbook).map_err(CliError::from)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for name in names {
        writeln!(handle, "{}", name).map_err(|e| CliError::general(e.to_string()))?;
    }
    Ok(())
}
