use std::borrow::Cow;

use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A scalar cell as handed over by a loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Text form of the cell, untrimmed. Integral numbers render without a
    /// fractional part so numeric styles and sizes compare like their text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// Trimmed text form, owned.
    pub fn trimmed(&self) -> String {
        self.as_text().trim().to_string()
    }

    /// Lenient numeric coercion. Blank, non-numeric and non-finite values
    /// coerce to zero; this never fails.
    pub fn as_quantity(&self) -> f64 {
        let value = match self {
            Self::Empty => 0.0,
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Cell at `row`; rows past the end of a short column read as empty.
    pub fn get(&self, row: usize) -> &Cell {
        self.cells.get(row).unwrap_or(&EMPTY_CELL)
    }
}

/// Column-oriented table with trimmed header names.
///
/// Loaders build it once; the engine only ever borrows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column. The header is trimmed.
    pub fn with_column(mut self, name: &str, cells: Vec<Cell>) -> Self {
        self.push_column(name, cells);
        self
    }

    /// Append a column. The header is trimmed; a header that repeats an
    /// existing one gets a `.1`, `.2`, ... suffix so every name is unique.
    pub fn push_column(&mut self, name: &str, cells: Vec<Cell>) {
        let name = self.unique_name(name.trim());
        self.columns.push(Column { name, cells });
    }

    fn unique_name(&self, name: &str) -> String {
        let taken = |candidate: &str| self.columns.iter().any(|c| c.name == candidate);
        if !taken(name) {
            return name.to_string();
        }
        (1usize..)
            .map(|n| format!("{name}.{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_default()
    }

    /// Build from a header row plus row-major data. Ragged rows are padded
    /// with empty cells; cells beyond the header are dropped.
    pub fn from_rows<S: AsRef<str>>(name: impl Into<String>, headers: &[S], rows: Vec<Vec<Cell>>) -> Self {
        let mut dataset = Self::new(name);
        for header in headers {
            dataset.push_column(header.as_ref(), Vec::with_capacity(rows.len()));
        }

        for row in rows {
            let mut cells = row.into_iter();
            for column in &mut dataset.columns {
                column.cells.push(cells.next().unwrap_or(Cell::Empty));
            }
        }

        dataset
    }

    /// Parse CSV text with a header row. Every non-empty field is kept as
    /// text, so codes keep their leading zeros.
    pub fn from_csv(name: &str, csv_data: &str, delimiter: u8) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(csv_data.as_bytes());

        let csv_err = |e: csv::Error| ReconError::CsvParse {
            dataset: name.to_string(),
            message: e.to_string(),
        };

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            rows.push(record.iter().map(Cell::from).collect());
        }

        Ok(Self::from_rows(name, &headers, rows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Column with exactly this (trimmed) name. Names are unique.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
