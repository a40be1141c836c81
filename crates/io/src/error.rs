use std::fmt;

use packlist_recon::ReconError;

#[derive(Debug)]
pub enum LoadError {
    /// File could not be read.
    Io { path: String, message: String },
    /// The spreadsheet reader rejected the file or a sheet.
    Workbook(String),
    /// Workbook has no sheets at all.
    EmptyWorkbook,
    /// No sheet name matched the packing and/or code patterns.
    SheetsNotFound {
        packing: bool,
        codes: bool,
        available: Vec<String>,
    },
    /// A sheet requested by name does not exist.
    UnknownSheet { name: String, available: Vec<String> },
    /// CSV text could not be turned into a dataset.
    Recon(ReconError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Workbook(msg) => write!(f, "workbook error: {msg}"),
            Self::EmptyWorkbook => write!(f, "workbook contains no sheets"),
            Self::SheetsNotFound { packing, codes, available } => {
                let mut missing = Vec::new();
                if !packing {
                    missing.push("packing");
                }
                if !codes {
                    missing.push("code reference");
                }
                write!(
                    f,
                    "no {} sheet found; available sheets: {available:?}",
                    missing.join(" or ")
                )
            }
            Self::UnknownSheet { name, available } => {
                write!(f, "sheet '{name}' not found; available sheets: {available:?}")
            }
            Self::Recon(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ReconError> for LoadError {
    fn from(err: ReconError) -> Self {
        Self::Recon(err)
    }
}
