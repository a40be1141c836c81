//! CLI Exit Code Registry
//!
//! Single source of truth for `packlist` exit codes. Scripts rely on them.
//! Code 1 is not used; a run either maps to a specific code below or succeeds.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain        | Description                                  |
//! |---------|---------------|----------------------------------------------|
//! | 0       | Universal     | Success                                      |
//! | 2       | Universal     | Usage error (bad args, bad config, no sheet) |
//! | 3       | Universal     | Input/output error                           |
//! | 60-69   | consolidation | Engine outcomes                              |

use packlist_io::LoadError;
use packlist_recon::ReconError;

// =============================================================================
// Universal (0, 2-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, invalid config, sheet not found.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input or write the output.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Consolidation (60-69)
// =============================================================================

/// A required logical field did not resolve to any column.
pub const EXIT_SCHEMA_MISMATCH: u8 = 60;

/// No packing column header carries a size token.
pub const EXIT_NO_SIZE_COLUMNS: u8 = 61;

/// Unexpected fault while processing rows.
pub const EXIT_PROCESSING_FAILURE: u8 = 62;

/// Inputs were valid but no row matched a code.
pub const EXIT_EMPTY_CONSOLIDATION: u8 = 63;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_USAGE,
        ReconError::CsvParse { .. } => EXIT_IO,
        ReconError::SchemaMismatch { .. } => EXIT_SCHEMA_MISMATCH,
        ReconError::NoSizeColumnsFound { .. } => EXIT_NO_SIZE_COLUMNS,
        ReconError::ProcessingFailure { .. } => EXIT_PROCESSING_FAILURE,
    }
}

/// Map a loader error to its exit code.
pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::Io { .. } | LoadError::Workbook(_) | LoadError::EmptyWorkbook => EXIT_IO,
        LoadError::SheetsNotFound { .. } | LoadError::UnknownSheet { .. } => EXIT_USAGE,
        LoadError::Recon(e) => recon_exit_code(e),
    }
}
