// Consolidated table export: xlsx when available, CSV otherwise

use packlist_recon::config::ExportConfig;
use packlist_recon::ConsolidatedTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub sheet_name: String,
    pub file_stem: String,
    pub max_column_width: usize,
    pub column_padding: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            file_stem: config.file_stem.clone(),
            max_column_width: config.max_column_width,
            column_padding: config.column_padding,
        }
    }
}

/// Serialized table, ready to write or hand out as a download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    /// Set when the preferred format could not be produced.
    pub notice: Option<String>,
    file_stem: String,
}

impl ExportArtifact {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.format.extension())
    }
}

/// Serialize the table. Falls back to CSV instead of failing.
pub fn serialize(table: &ConsolidatedTable, options: &ExportOptions) -> ExportArtifact {
    let widths = column_widths(table, options);

    match write_xlsx(table, options, &widths) {
        Ok(bytes) => ExportArtifact {
            bytes,
            format: ExportFormat::Xlsx,
            notice: None,
            file_stem: options.file_stem.clone(),
        },
        Err(reason) => {
            log::warn!("xlsx export unavailable, writing CSV instead: {reason}");
            let bytes = match write_csv(table) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("CSV export failed: {e}");
                    ConsolidatedTable::HEADER.join(",").into_bytes()
                }
            };
            ExportArtifact {
                bytes,
                format: ExportFormat::Csv,
                notice: Some(format!("spreadsheet export unavailable ({reason}); exported as CSV")),
                file_stem: options.file_stem.clone(),
            }
        }
    }
}

/// Display width per column: longest value (header included) plus padding, capped.
pub fn column_widths(table: &ConsolidatedTable, options: &ExportOptions) -> Vec<usize> {
    let mut widths: Vec<usize> = ConsolidatedTable::HEADER
        .iter()
        .map(|h| h.chars().count())
        .collect();

    for row in &table.rows {
        for (width, value) in widths.iter_mut().zip(row.text_cells().iter()) {
            *width = (*width).max(value.chars().count());
        }
    }

    widths
        .into_iter()
        .map(|w| (w + options.column_padding).min(options.max_column_width))
        .collect()
}

/// UTF-8 CSV with the header always present.
pub fn write_csv(table: &ConsolidatedTable) -> Result<Vec<u8>, String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(ConsolidatedTable::HEADER)
        .map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer
            .write_record(row.text_cells())
            .map_err(|e| e.to_string())?;
    }
    writer.into_inner().map_err(|e| e.to_string())
}

#[cfg(feature = "xlsx")]
fn write_xlsx(
    table: &ConsolidatedTable,
    options: &ExportOptions,
    widths: &[usize],
) -> Result<Vec<u8>, String> {
    use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

    const UNITS_COL: u16 = 6;

    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(&options.sheet_name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", options.sheet_name, e))?;

    let header_format = Format::new().set_bold();
    for (col, title) in ConsolidatedTable::HEADER.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *title, &header_format)
            .map_err(|e| format!("Failed to write header: {e}"))?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let xl_row = idx as u32 + 1;
        for (col, value) in row.text_cells().iter().enumerate() {
            let col = col as u16;
            let written = if col == UNITS_COL {
                worksheet.write_number(xl_row, col, row.units as f64)
            } else {
                // Codes stay text so leading zeros survive.
                worksheet.write_string(xl_row, col, value)
            };
            written.map_err(|e| format!("Failed to write row {xl_row}: {e}"))?;
        }
    }

    for (col, width) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width as f64)
            .map_err(|e| format!("Failed to set column {col} width: {e}"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to save workbook: {e}"))
}

#[cfg(not(feature = "xlsx"))]
fn write_xlsx(
    _table: &ConsolidatedTable,
    _options: &ExportOptions,
    _widths: &[usize],
) -> Result<Vec<u8>, String> {
    Err("built without the xlsx feature".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use packlist_recon::ConsolidatedRow;

    fn row(code: &str, style: &str, color: &str, size: &str, units: u64) -> ConsolidatedRow {
        ConsolidatedRow {
            code: code.into(),
            style: style.into(),
            description: String::new(),
            color: color.into(),
            size: size.into(),
            purchase_order: "912".into(),
            units,
        }
    }

    fn sample_table() -> ConsolidatedTable {
        ConsolidatedTable {
            rows: vec![
                row("000111222", "A1", "Blue", "2Y", 3),
                row("000111333", "A1", "Blue", "3Y", 12),
            ],
        }
    }

    #[test]
    fn widths_follow_longest_value() {
        let widths = column_widths(&sample_table(), &ExportOptions::default());
        // "000111222" is 9 chars, header "UPC" is 3.
        assert_eq!(widths[0], 11);
        // "Style #" header is the longest in its column.
        assert_eq!(widths[1], 9);
        // "Units" beats "12".
        assert_eq!(widths[6], 7);
    }

    #[test]
    fn widths_are_capped() {
        let mut table = sample_table();
        table.rows[0].description = "x".repeat(120);
        let widths = column_widths(&table, &ExportOptions::default());
        assert_eq!(widths[2], 50);
    }

    #[test]
    fn csv_has_header_even_when_empty() {
        let bytes = write_csv(&ConsolidatedTable::default()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "UPC,Style #,Description,Color,Size,PO,Units\n"
        );
    }

    #[test]
    fn csv_keeps_leading_zeros() {
        let text = String::from_utf8(write_csv(&sample_table()).unwrap()).unwrap();
        assert!(text.contains("000111222,A1,,Blue,2Y,912,3\n"));
    }

    #[test]
    fn format_metadata() {
        assert_eq!(ExportFormat::Xlsx.extension(), "xlsx");
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert!(ExportFormat::Csv.mime_type().starts_with("text/csv"));
    }

    #[cfg(feature = "xlsx")]
    mod xlsx {
        use super::*;
        use calamine::{open_workbook_auto_from_rs, Data, Reader};
        use std::io::Cursor;

        fn read_back(bytes: Vec<u8>, sheet: &str) -> Vec<Vec<Data>> {
            let mut wb = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
            let range = wb.worksheet_range(sheet).unwrap();
            range.rows().map(|r| r.to_vec()).collect()
        }

        #[test]
        fn writes_header_and_typed_rows() {
            let artifact = serialize(&sample_table(), &ExportOptions::default());
            assert_eq!(artifact.format, ExportFormat::Xlsx);
            assert!(artifact.notice.is_none());
            assert_eq!(artifact.file_name(), "consolidado_packing_list.xlsx");

            let rows = read_back(artifact.bytes, "Consolidated");
            assert_eq!(rows.len(), 3);
            assert_eq!(rows[0][0], Data::String("UPC".into()));
            assert_eq!(rows[0][6], Data::String("Units".into()));
            assert_eq!(rows[1][0], Data::String("000111222".into()));
            assert_eq!(rows[2][6], Data::Float(12.0));
        }

        #[test]
        fn empty_table_still_has_header() {
            let artifact = serialize(&ConsolidatedTable::default(), &ExportOptions::default());
            assert_eq!(artifact.format, ExportFormat::Xlsx);
            let rows = read_back(artifact.bytes, "Consolidated");
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].len(), 7);
        }

        #[test]
        fn invalid_sheet_name_falls_back_to_csv() {
            let options = ExportOptions {
                sheet_name: "bad/name".into(),
                ..ExportOptions::default()
            };
            let artifact = serialize(&sample_table(), &options);
            assert_eq!(artifact.format, ExportFormat::Csv);
            assert!(artifact.notice.is_some());
            assert_eq!(artifact.file_name(), "consolidado_packing_list.csv");
            let text = String::from_utf8(artifact.bytes).unwrap();
            assert!(text.starts_with("UPC,Style #"));
        }
    }
}
