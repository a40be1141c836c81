//! `packlist sheets` — list workbook sheets and the role each would play.

use std::path::PathBuf;

use packlist_io::workbook::{self, NamedSheet, SheetChoice};
use serde::Serialize;

use crate::consolidate::load_config;
use crate::CliError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SheetInfo {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
}

pub fn describe_sheets(sheets: &[NamedSheet], choice: &SheetChoice) -> Vec<SheetInfo> {
    sheets
        .iter()
        .map(|sheet| {
            let role = if choice.packing.as_deref() == Some(sheet.name.as_str()) {
                Some("packing")
            } else if choice.codes.as_deref() == Some(sheet.name.as_str()) {
                Some("codes")
            } else {
                None
            };
            SheetInfo {
                name: sheet.name.clone(),
                rows: sheet.dataset.row_count(),
                columns: sheet.dataset.column_names(),
                role,
            }
        })
        .collect()
}

pub fn cmd_sheets(workbook_path: PathBuf, config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let sheets = workbook::load_workbook(&workbook_path).map_err(CliError::load)?;
    let names: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
    let choice = workbook::choose_sheets(&names, &config.sheets);
    let infos = describe_sheets(&sheets, &choice);

    if json {
        let out = serde_json::to_string_pretty(&infos)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    for info in &infos {
        let role = info.role.map(|r| format!("  [{r}]")).unwrap_or_default();
        println!("{}  ({} rows, {} columns){role}", info.name, info.rows, info.columns.len());
    }
    if choice.packing.is_none() || choice.codes.is_none() {
        eprintln!("note: sheet names did not identify both a packing and a code sheet");
    }
    Ok(())
}
