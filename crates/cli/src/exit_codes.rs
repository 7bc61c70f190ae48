//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on these values.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | Usage or config error                    |
//! | 3-9     | flatten          | Workbook and artifact file errors        |
//! | 60-69   | inference        | Endpoint call failures                   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant error conversion in `main.rs`

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. stdout closed).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid config, nothing to do.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Flatten (3-9)
// =============================================================================

/// Workbook or artifact file missing or unreadable.
pub const EXIT_FILE_ACCESS: u8 = 3;

/// Named sheet absent, or workbook has no sheets.
pub const EXIT_SHEET_NOT_FOUND: u8 = 4;

// =============================================================================
// Inference (60-69)
// =============================================================================

/// Endpoint answered with a non-200 status.
pub const EXIT_ENDPOINT_STATUS: u8 = 60;

/// Endpoint unreachable or the request did not complete.
pub const EXIT_ENDPOINT_NETWORK: u8 = 61;

/// 200 response whose body is not a generate result.
pub const EXIT_ENDPOINT_MALFORMED: u8 = 62;
