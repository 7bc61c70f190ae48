// Workbook flattening: cell maps and prompt artifacts

pub mod artifact;
pub mod cell;
pub mod xlsx;

pub use artifact::{
    parse_artifact, read_artifact, serialize, write_artifact,
    Artifact, ArtifactError, ArtifactFormat, ScanBounds,
};
pub use cell::{cell_address, col_to_letter, scan_column_label, CellMap, CellValue, MAX_SCAN_COLS};
pub use xlsx::{flatten_sheet, list_sheets, FlattenError, FlattenedSheet};
