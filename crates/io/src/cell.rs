// Cell values and the coordinate-keyed cell map

use std::collections::HashMap;
use std::fmt;

/// Columns reachable by the artifact scan (A..Z, then AA..AZ)
pub const MAX_SCAN_COLS: usize = 52;

/// A single non-empty cell value as read from the workbook.
///
/// Formula cells carry their cached result, never the formula text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Int(i64),
    Text(String),
    Bool(bool),
    /// Rendered as `YYYY-MM-DD HH:MM:SS`
    DateTime(String),
    /// Error literal such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// Empty text counts as an empty cell.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => {
                // Integers without decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Int(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::DateTime(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Mapping from native coordinate ("A1", "AA23") to value.
///
/// Holds only non-empty cells. Iteration order is unspecified; ordering is
/// imposed by the artifact scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellMap {
    cells: HashMap<String, CellValue>,
}

impl CellMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value at a 0-indexed position. Empty values are ignored.
    /// Returns true if the value was stored.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) -> bool {
        self.insert(cell_address(row, col), value)
    }

    /// Insert a value under an explicit coordinate. Empty values are ignored.
    pub fn insert(&mut self, coordinate: impl Into<String>, value: CellValue) -> bool {
        if value.is_empty() {
            return false;
        }
        self.cells.insert(coordinate.into(), value);
        true
    }

    pub fn get(&self, coordinate: &str) -> Option<&CellValue> {
        self.cells.get(coordinate)
    }

    pub fn contains(&self, coordinate: &str) -> bool {
        self.cells.contains_key(coordinate)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Convert column index to Excel column letter (0 = A, 25 = Z, 26 = AA, etc.)
pub fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Convert 0-indexed row/col to a cell address (e.g., "A1", "B5", "AA100")
pub fn cell_address(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letter(col), row + 1)
}

/// Column label used by the artifact scan.
///
/// Only `A`..`Z` followed by `AA`..`AZ` are produced. Anything past `AZ`
/// returns None instead of continuing the base-26 sequence.
pub fn scan_column_label(col: usize) -> Option<String> {
    match col {
        0..=25 => Some(((b'A' + col as u8) as char).to_string()),
        26..=51 => Some(format!("A{}", (b'A' + (col - 26) as u8) as char)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_letter() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(51), "AZ");
        assert_eq!(col_to_letter(52), "BA");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
    }

    #[test]
    fn test_scan_label_agrees_with_native_labels() {
        for col in 0..MAX_SCAN_COLS {
            assert_eq!(scan_column_label(col).as_deref(), Some(col_to_letter(col).as_str()));
        }
    }

    #[test]
    fn test_scan_label_stops_after_az() {
        assert_eq!(scan_column_label(51).as_deref(), Some("AZ"));
        assert_eq!(scan_column_label(52), None);
        assert_eq!(scan_column_label(1000), None);
    }

    #[test]
    fn test_cell_address() {
        assert_eq!(cell_address(0, 0), "A1");
        assert_eq!(cell_address(22, 26), "AA23");
    }

    #[test]
    fn test_number_display_is_type_agnostic() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Text("42".into()).to_string(), "42");
        assert_eq!(CellValue::Number(-3.25).to_string(), "-3.25");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::Bool(false).to_string(), "False");
    }

    #[test]
    fn test_cell_map_skips_empty_text() {
        let mut cells = CellMap::new();
        assert!(!cells.set(0, 0, CellValue::Text(String::new())));
        assert!(cells.set(1, 1, CellValue::Text("Revenue".into())));
        assert_eq!(cells.len(), 1);
        assert!(cells.contains("B2"));
        assert!(!cells.contains("A1"));
    }
}
