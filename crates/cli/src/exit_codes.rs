//! CLI Exit Code Registry
//!
//! Single source of truth for every code the binary can return.
//! Exit codes are part of the shell contract - batch scripts branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args)               |
//! | 3-9     | input     | Registry file loading codes              |
//! | 10-19   | run       | Reconciliation run codes                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (3-9)
// =============================================================================

/// Registry file unreadable or unparseable (missing file, bad CSV,
/// absent worksheet, filter column not found).
pub const EXIT_INPUT_READ: u8 = 3;

/// `check` found required columns missing from an input table.
pub const EXIT_INPUT_NOT_READY: u8 = 4;

// =============================================================================
// Run (10-19)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_RUN_INVALID_CONFIG: u8 = 10;

/// The run completed degraded: diagnostics were reported and some or all
/// result tables came back empty.
pub const EXIT_RUN_DEGRADED: u8 = 11;

/// Output workbook could not be written.
pub const EXIT_RUN_WRITE: u8 = 12;
