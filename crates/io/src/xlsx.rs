// Workbook reading via calamine (xlsx, xlsm, xls, xlsb, ods)
//
// Cells are read as their cached values. Formula text is never imported.

use std::path::{Path, PathBuf};
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader};

use crate::cell::{CellMap, CellValue};

/// Error type for workbook reading.
#[derive(Debug)]
pub enum FlattenError {
    /// Workbook path does not exist
    FileNotFound(PathBuf),
    /// Workbook exists but could not be opened
    Open(String),
    /// Named sheet is absent
    SheetNotFound { name: String, available: Vec<String> },
    /// Sheet exists but could not be read
    Read { sheet: String, message: String },
    /// Workbook has no sheets at all
    NoSheets,
}

impl std::fmt::Display for FlattenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlattenError::FileNotFound(path) => write!(f, "workbook not found: {}", path.display()),
            FlattenError::Open(msg) => write!(f, "failed to open workbook: {}", msg),
            FlattenError::SheetNotFound { name, available } => write!(
                f,
                "sheet '{}' not found (available: {})",
                name,
                available.join(", ")
            ),
            FlattenError::Read { sheet, message } => {
                write!(f, "failed to read sheet '{}': {}", sheet, message)
            }
            FlattenError::NoSheets => write!(f, "workbook contains no sheets"),
        }
    }
}

impl std::error::Error for FlattenError {}

/// A sheet reduced to its non-empty cells.
#[derive(Debug, Clone)]
pub struct FlattenedSheet {
    pub sheet_name: String,
    pub cells: CellMap,
}

/// List sheet names in workbook order.
pub fn list_sheets(path: &Path) -> Result<Vec<String>, FlattenError> {
    if !path.exists() {
        return Err(FlattenError::FileNotFound(path.to_path_buf()));
    }
    let workbook = open_workbook_auto(path).map_err(|e| FlattenError::Open(e.to_string()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one sheet of a workbook into a [`CellMap`].
///
/// With `sheet = None` the first sheet in workbook order is used.
pub fn flatten_sheet(path: &Path, sheet: Option<&str>) -> Result<FlattenedSheet, FlattenError> {
    let start_time = Instant::now();

    if !path.exists() {
        return Err(FlattenError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| FlattenError::Open(e.to_string()))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(FlattenError::SheetNotFound {
                    name: name.to_string(),
                    available: sheet_names,
                });
            }
            name.to_string()
        }
        None => sheet_names.first().cloned().ok_or(FlattenError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| FlattenError::Read {
            sheet: sheet_name.clone(),
            message: e.to_string(),
        })?;

    // Range start offset (data may not begin at A1)
    let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));

    let mut cells = CellMap::new();
    for (row_idx, col_idx, data) in range.used_cells() {
        let Some(value) = cell_value(data) else {
            continue;
        };
        cells.set(
            data_start_row as usize + row_idx,
            data_start_col as usize + col_idx,
            value,
        );
    }

    log::info!(
        "read {} non-empty cells from '{}' in {}ms",
        cells.len(),
        sheet_name,
        start_time.elapsed().as_millis()
    );

    Ok(FlattenedSheet { sheet_name, cells })
}

/// Map a calamine cell to a value. None for empty cells.
fn cell_value(data: &Data) -> Option<CellValue> {
    let value = match data {
        Data::Empty => return None,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::DateTime(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            // Out-of-range serials keep their numeric form
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    };
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("model.xlsx");
        let mut workbook = Workbook::new();

        let summary = workbook.add_worksheet();
        summary.set_name("Summary").unwrap();
        summary.write_string(0, 0, "cover").unwrap();

        let model = workbook.add_worksheet();
        model.set_name("MSFT-Model").unwrap();
        model.write_number(0, 0, 42.0).unwrap();
        model.write_string(1, 1, "Revenue").unwrap();
        model.write_number(2, 27, 1.5).unwrap();
        model.write_boolean(3, 0, false).unwrap();
        model.write_string(4, 0, "").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_flatten_named_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let sheet = flatten_sheet(&path, Some("MSFT-Model")).unwrap();
        assert_eq!(sheet.sheet_name, "MSFT-Model");
        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.cells.get("A1").map(|v| v.to_string()), Some("42".to_string()));
        assert_eq!(sheet.cells.get("B2"), Some(&CellValue::Text("Revenue".into())));
        assert_eq!(sheet.cells.get("AB3").map(|v| v.to_string()), Some("1.5".to_string()));
        assert_eq!(sheet.cells.get("A4"), Some(&CellValue::Bool(false)));
        assert!(!sheet.cells.contains("A5"));
    }

    #[test]
    fn test_flatten_defaults_to_first_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let sheet = flatten_sheet(&path, None).unwrap();
        assert_eq!(sheet.sheet_name, "Summary");
        assert_eq!(sheet.cells.len(), 1);
        assert!(sheet.cells.contains("A1"));
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        match flatten_sheet(&path, Some("Nope")) {
            Err(FlattenError::SheetNotFound { name, available }) => {
                assert_eq!(name, "Nope");
                assert_eq!(available, vec!["Summary".to_string(), "MSFT-Model".to_string()]);
            }
            other => panic!("expected SheetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = flatten_sheet(Path::new("/definitely/not/here.xlsx"), None).unwrap_err();
        assert!(matches!(err, FlattenError::FileNotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_list_sheets() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        assert_eq!(list_sheets(&path).unwrap(), vec!["Summary", "MSFT-Model"]);
    }

    #[test]
    fn test_data_offset_from_a1() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offset.xlsx");
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_number(9, 3, 7.0).unwrap();
        workbook.save(&path).unwrap();

        let sheet = flatten_sheet(&path, None).unwrap();
        assert_eq!(sheet.cells.len(), 1);
        assert!(sheet.cells.contains("D10"));
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::String(String::new())), None);
        assert_eq!(cell_value(&Data::Int(5)), Some(CellValue::Int(5)));
        assert_eq!(
            cell_value(&Data::DurationIso("PT1H".into())),
            Some(CellValue::Text("PT1H".into()))
        );
    }
}
