use std::collections::BTreeSet;

use crate::dataset::Dataset;
use crate::model::{ConsolidatedTable, SampleTable, TableSummary};

pub const PACKING_SAMPLE_ROWS: usize = 3;
pub const PACKING_SAMPLE_SIZES: usize = 3;
pub const CODE_SAMPLE_ROWS: usize = 10;

/// Row count, unit total and distinct styles / colors of a consolidated table.
pub fn compute_summary(table: &ConsolidatedTable) -> TableSummary {
    let styles: BTreeSet<&str> = table.rows.iter().map(|r| r.style.as_str()).collect();
    let colors: BTreeSet<&str> = table.rows.iter().map(|r| r.color.as_str()).collect();

    TableSummary {
        rows: table.rows.len(),
        total_units: table.rows.iter().map(|r| r.units).fold(0u64, u64::saturating_add),
        unique_styles: styles.len(),
        unique_colors: colors.len(),
    }
}

/// First `limit` rows of the named columns, as trimmed text. Names that are
/// not in the dataset are skipped.
pub fn sample(dataset: &Dataset, columns: &[&str], limit: usize) -> SampleTable {
    let cols: Vec<_> = columns.iter().filter_map(|name| dataset.column(name)).collect();
    let rows = (0..dataset.row_count().min(limit))
        .map(|row| cols.iter().map(|c| c.get(row).trimmed()).collect())
        .collect();

    SampleTable {
        columns: cols.iter().map(|c| c.name.clone()).collect(),
        rows,
    }
}
