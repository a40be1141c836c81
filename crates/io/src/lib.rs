// File I/O around the reconciliation engine

pub mod csv;
pub mod error;
pub mod export;
pub mod workbook;

pub use error::LoadError;
pub use export::{serialize, ExportArtifact, ExportFormat, ExportOptions};
pub use workbook::{load_workbook, load_workbook_bytes, select_sheets, NamedSheet, SelectedSheets};
