// Workbook import (xlsx, xls, xlsb, ods) and packing / code sheet selection

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use packlist_recon::config::SheetPatterns;
use packlist_recon::{Cell, Dataset};

use crate::error::LoadError;

/// A sheet turned into a dataset, named after the sheet.
#[derive(Debug, Clone)]
pub struct NamedSheet {
    pub name: String,
    pub dataset: Dataset,
}

/// Sheet names picked for each role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetChoice {
    pub packing: Option<String>,
    pub codes: Option<String>,
}

/// The two datasets the engine needs.
#[derive(Debug, Clone)]
pub struct SelectedSheets {
    pub packing: Dataset,
    pub codes: Dataset,
}

/// Open a workbook from disk and convert every sheet.
pub fn load_workbook(path: &Path) -> Result<Vec<NamedSheet>, LoadError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| LoadError::Workbook(format!("failed to open {}: {e}", path.display())))?;
    read_sheets(&mut workbook)
}

/// Same as [`load_workbook`] for an in-memory upload.
pub fn load_workbook_bytes(bytes: Vec<u8>) -> Result<Vec<NamedSheet>, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Workbook(format!("failed to open workbook: {e}")))?;
    read_sheets(&mut workbook)
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<NamedSheet>, LoadError> {
    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(LoadError::EmptyWorkbook);
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| LoadError::Workbook(format!("failed to read sheet '{name}': {e}")))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(idx, cell)| header_name(idx, cell))
                .collect(),
            None => Vec::new(),
        };
        let data: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(to_cell).collect()).collect();

        log::debug!(
            "sheet '{name}': {} column(s), {} data row(s)",
            headers.len(),
            data.len()
        );

        sheets.push(NamedSheet {
            dataset: Dataset::from_rows(name.as_str(), &headers, data),
            name,
        });
    }

    Ok(sheets)
}

fn header_name(idx: usize, cell: &Data) -> String {
    let name = to_cell(cell).trimmed();
    if name.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name
    }
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        // Serial date number; the engine never compares dates.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}

// ---------------------------------------------------------------------------
// Sheet selection
// ---------------------------------------------------------------------------

/// Walk sheet names in order: a name containing a packing pattern is the
/// packing sheet, otherwise one containing a code pattern is the code sheet.
/// Later matches replace earlier ones.
pub fn choose_sheets(names: &[String], patterns: &SheetPatterns) -> SheetChoice {
    let contains_any = |upper: &str, list: &[String]| {
        list.iter()
            .map(|p| p.trim().to_uppercase())
            .any(|p| !p.is_empty() && upper.contains(&p))
    };

    let mut choice = SheetChoice::default();
    for name in names {
        let upper = name.to_uppercase();
        if contains_any(&upper, &patterns.packing) {
            choice.packing = Some(name.clone());
        } else if contains_any(&upper, &patterns.codes) {
            choice.codes = Some(name.clone());
        }
    }
    choice
}

/// Pull the packing and code datasets out of a loaded workbook. Explicit
/// names take precedence over pattern matching.
pub fn select_sheets(
    sheets: Vec<NamedSheet>,
    patterns: &SheetPatterns,
    packing_name: Option<&str>,
    codes_name: Option<&str>,
) -> Result<SelectedSheets, LoadError> {
    let available: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();

    let check = |name: &str| -> Result<String, LoadError> {
        if available.iter().any(|a| a == name) {
            Ok(name.to_string())
        } else {
            Err(LoadError::UnknownSheet {
                name: name.to_string(),
                available: available.clone(),
            })
        }
    };

    let auto = choose_sheets(&available, patterns);
    let packing = match packing_name {
        Some(name) => Some(check(name)?),
        None => auto.packing,
    };
    let codes = match codes_name {
        Some(name) => Some(check(name)?),
        None => auto.codes,
    };

    let (Some(packing), Some(codes)) = (packing.clone(), codes.clone()) else {
        return Err(LoadError::SheetsNotFound {
            packing: packing.is_some(),
            codes: codes.is_some(),
            available,
        });
    };

    log::info!("packing sheet: '{packing}', code sheet: '{codes}'");

    let mut packing_ds = None;
    let mut codes_ds = None;
    for sheet in sheets {
        if sheet.name == packing {
            packing_ds = Some(sheet.dataset.clone());
        }
        if sheet.name == codes {
            codes_ds = Some(sheet.dataset);
        }
    }

    match (packing_ds, codes_ds) {
        (Some(packing), Some(codes)) => Ok(SelectedSheets { packing, codes }),
        _ => Err(LoadError::SheetsNotFound {
            packing: true,
            codes: true,
            available,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sheet(name: &str) -> NamedSheet {
        NamedSheet {
            name: name.into(),
            dataset: Dataset::new(name).with_column("Style", vec![Cell::text(name)]),
        }
    }

    #[test]
    fn picks_packing_and_upc_sheets() {
        let choice = choose_sheets(&names(&["Notes", "Packing List", "UPC"]), &SheetPatterns::default());
        assert_eq!(choice.packing.as_deref(), Some("Packing List"));
        assert_eq!(choice.codes.as_deref(), Some("UPC"));
    }

    #[test]
    fn matching_is_case_insensitive_and_by_substring() {
        let choice = choose_sheets(&names(&["pl 2024", "upc codes"]), &SheetPatterns::default());
        assert_eq!(choice.packing.as_deref(), Some("pl 2024"));
        assert_eq!(choice.codes.as_deref(), Some("upc codes"));
    }

    #[test]
    fn packing_pattern_wins_over_code_pattern() {
        // "UPC PL" matches both; packing is checked first.
        let choice = choose_sheets(&names(&["UPC PL"]), &SheetPatterns::default());
        assert_eq!(choice.packing.as_deref(), Some("UPC PL"));
        assert_eq!(choice.codes, None);
    }

    #[test]
    fn later_sheet_replaces_earlier() {
        let choice = choose_sheets(&names(&["PL old", "PL new", "UPC"]), &SheetPatterns::default());
        assert_eq!(choice.packing.as_deref(), Some("PL new"));
    }

    #[test]
    fn select_reports_missing_role() {
        let err = select_sheets(
            vec![sheet("Packing"), sheet("Sheet2")],
            &SheetPatterns::default(),
            None,
            None,
        )
        .unwrap_err();
        match err {
            LoadError::SheetsNotFound { packing, codes, available } => {
                assert!(packing);
                assert!(!codes);
                assert_eq!(available, vec!["Packing", "Sheet2"]);
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn explicit_names_override_patterns() {
        let selected = select_sheets(
            vec![sheet("Packing"), sheet("Codes"), sheet("UPC")],
            &SheetPatterns::default(),
            None,
            Some("Codes"),
        )
        .unwrap();
        assert_eq!(selected.packing.name(), "Packing");
        assert_eq!(selected.codes.name(), "Codes");
    }

    #[test]
    fn unknown_explicit_name_is_an_error() {
        let err = select_sheets(vec![sheet("PL")], &SheetPatterns::default(), Some("Nope"), None)
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownSheet { .. }));
    }

    #[test]
    fn cell_conversion() {
        assert_eq!(to_cell(&Data::Int(4)), Cell::Number(4.0));
        assert_eq!(to_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(to_cell(&Data::Bool(true)), Cell::text("TRUE"));
        assert_eq!(header_name(3, &Data::Empty), "Unnamed: 3");
        assert_eq!(header_name(0, &Data::Float(2.0)), "2");
    }
}
