use serde::Serialize;

use crate::schema::ResolvedSchema;

// ---------------------------------------------------------------------------
// Consolidated rows
// ---------------------------------------------------------------------------

/// One output line. `units` is summed across duplicate keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedRow {
    pub code: String,
    pub style: String,
    pub description: String,
    pub color: String,
    pub size: String,
    pub purchase_order: String,
    pub units: u64,
}

impl ConsolidatedRow {
    pub fn key(&self) -> RowKey {
        RowKey {
            code: self.code.clone(),
            style: self.style.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
            purchase_order: self.purchase_order.clone(),
        }
    }

    /// Cells in header order, for writers.
    pub fn text_cells(&self) -> [String; 7] {
        [
            self.code.clone(),
            self.style.clone(),
            self.description.clone(),
            self.color.clone(),
            self.size.clone(),
            self.purchase_order.clone(),
            self.units.to_string(),
        ]
    }
}

/// Grouping key = every column except `units`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub code: String,
    pub style: String,
    pub description: String,
    pub color: String,
    pub size: String,
    pub purchase_order: String,
}

/// Final table: unique keys, sorted by (style, color, size).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidatedTable {
    pub rows: Vec<ConsolidatedRow>,
}

impl ConsolidatedTable {
    pub const HEADER: [&'static str; 7] =
        ["UPC", "Style #", "Description", "Color", "Size", "PO", "Units"];

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub total_units: u64,
    pub unique_styles: usize,
    pub unique_colors: usize,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A positive quantity with no code row for its (style, color, size).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedLookup {
    /// Zero-based data row in the packing dataset.
    pub row: usize,
    pub style: String,
    pub color: String,
    pub size: String,
    pub quantity: f64,
}

/// A few leading rows of an input, rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputSamples {
    pub packing: SampleTable,
    pub codes: SampleTable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub unmatched: Vec<UnmatchedLookup>,
    /// Non-blank quantity cells that coerced to zero or less.
    pub skipped_quantities: usize,
    /// Lookups that hit more than one code row (first one kept).
    pub ambiguous_lookups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<InputSamples>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconOutcome {
    Consolidated,
    /// Validation passed but no row survived matching.
    Empty,
}

impl std::fmt::Display for ReconOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consolidated => write!(f, "consolidated"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub outcome: ReconOutcome,
    pub summary: TableSummary,
    pub resolved: ResolvedSchema,
    pub table: ConsolidatedTable,
    pub diagnostics: Diagnostics,
}
