use std::fmt;

use crate::schema::LogicalField;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty vocabulary, blank candidates, etc.).
    ConfigValidation(String),
    /// Malformed CSV input.
    CsvParse { dataset: String, message: String },
    /// Required logical fields could not be resolved to a column.
    SchemaMismatch {
        dataset: String,
        missing: Vec<LogicalField>,
        columns: Vec<String>,
    },
    /// No packing column carries a known size token.
    NoSizeColumnsFound {
        columns: Vec<String>,
        tokens: Vec<String>,
    },
    /// Unexpected fault during row processing. Carries both column listings.
    ProcessingFailure {
        message: String,
        packing_columns: Vec<String>,
        code_columns: Vec<String>,
    },
}

impl ReconError {
    /// Short machine-readable tag, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "config_parse",
            Self::ConfigValidation(_) => "config_validation",
            Self::CsvParse { .. } => "csv_parse",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::NoSizeColumnsFound { .. } => "no_size_columns_found",
            Self::ProcessingFailure { .. } => "processing_failure",
        }
    }
}

fn join_fields(fields: &[LogicalField]) -> String {
    fields.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::CsvParse { dataset, message } => {
                write!(f, "dataset '{dataset}': cannot parse CSV: {message}")
            }
            Self::SchemaMismatch { dataset, missing, columns } => write!(
                f,
                "dataset '{dataset}': missing column(s) for {}; available columns: {columns:?}",
                join_fields(missing)
            ),
            Self::NoSizeColumnsFound { columns, tokens } => write!(
                f,
                "no size columns found (looked for {tokens:?}); available columns: {columns:?}"
            ),
            Self::ProcessingFailure { message, packing_columns, code_columns } => write!(
                f,
                "processing failed: {message}; packing columns: {packing_columns:?}; code columns: {code_columns:?}"
            ),
        }
    }
}

impl std::error::Error for ReconError {}
