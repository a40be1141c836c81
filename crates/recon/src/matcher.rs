use std::collections::HashMap;

use crate::dataset::Column;

/// Resolved columns of the code dataset.
#[derive(Debug, Clone, Copy)]
pub struct CodeColumns<'a> {
    pub style: &'a Column,
    pub color: &'a Column,
    pub size: &'a Column,
    pub code: &'a Column,
    pub purchase_order: Option<&'a Column>,
}

/// The code row picked for a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatch {
    pub row: usize,
    pub code: String,
    /// `None` when the code dataset has no purchase order column.
    pub purchase_order: Option<String>,
    /// How many code rows satisfied the key.
    pub candidates: usize,
}

/// Code rows bucketed by exact (trimmed style, trimmed size). Each bucket
/// keeps dataset order, so the first color hit is the first row a linear
/// scan would find.
pub struct CodeIndex<'a> {
    columns: CodeColumns<'a>,
    buckets: HashMap<(String, String), Vec<(usize, String)>>,
}

impl<'a> CodeIndex<'a> {
    pub fn build(columns: CodeColumns<'a>, row_count: usize) -> Self {
        let mut buckets: HashMap<(String, String), Vec<(usize, String)>> = HashMap::new();
        for row in 0..row_count {
            let key = (columns.style.get(row).trimmed(), columns.size.get(row).trimmed());
            let color = columns.color.get(row).trimmed().to_lowercase();
            buckets.entry(key).or_default().push((row, color));
        }
        Self { columns, buckets }
    }

    /// Style and size compare exactly, color case-insensitively. All three
    /// inputs are expected trimmed.
    pub fn lookup(&self, style: &str, color: &str, size: &str) -> Option<CodeMatch> {
        let bucket = self.buckets.get(&(style.to_string(), size.to_string()))?;
        let color = color.to_lowercase();

        let mut hits = bucket.iter().filter(|(_, c)| *c == color).map(|(row, _)| *row);
        let row = hits.next()?;
        let candidates = 1 + hits.count();

        Some(CodeMatch {
            row,
            code: self.columns.code.get(row).trimmed(),
            purchase_order: self.columns.purchase_order.map(|c| c.get(row).trimmed()),
            candidates,
        })
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, Dataset};

    fn codes() -> Dataset {
        let rows = [
            ["A1", "Blue", "2Y", "111", "PO-1"],
            ["A1", "blue", "2Y", "222", "PO-2"],
            ["A1", "Red", "2Y", "333", "PO-3"],
            ["ABC ", "Red", " 3Y", "444", "PO-4"],
            ["ABC1", "Red", "3Y", "555", "PO-5"],
        ];
        let col = |i: usize| rows.iter().map(|r| Cell::text(r[i])).collect::<Vec<_>>();
        Dataset::new("codes")
            .with_column("Style", col(0))
            .with_column("Color", col(1))
            .with_column("Size", col(2))
            .with_column("UPC", col(3))
            .with_column("PO", col(4))
    }

    fn columns(ds: &Dataset, with_po: bool) -> CodeColumns<'_> {
        CodeColumns {
            style: ds.column("Style").unwrap(),
            color: ds.column("Color").unwrap(),
            size: ds.column("Size").unwrap(),
            code: ds.column("UPC").unwrap(),
            purchase_order: if with_po { ds.column("PO") } else { None },
        }
    }

    /// Reference behavior: scan every row in order.
    fn scan(cols: CodeColumns<'_>, rows: usize, style: &str, color: &str, size: &str) -> Option<usize> {
        (0..rows).find(|&r| {
            cols.style.get(r).trimmed() == style
                && cols.size.get(r).trimmed() == size
                && cols.color.get(r).trimmed().to_lowercase() == color.to_lowercase()
        })
    }

    #[test]
    fn first_match_in_dataset_order() {
        let ds = codes();
        let index = CodeIndex::build(columns(&ds, true), ds.row_count());
        let m = index.lookup("A1", "BLUE", "2Y").unwrap();
        assert_eq!(m.row, 0);
        assert_eq!(m.code, "111");
        assert_eq!(m.purchase_order.as_deref(), Some("PO-1"));
        assert_eq!(m.candidates, 2);
    }

    #[test]
    fn style_and_size_are_exact_after_trim() {
        let ds = codes();
        let index = CodeIndex::build(columns(&ds, true), ds.row_count());
        assert_eq!(index.lookup("ABC", "red", "3Y").unwrap().code, "444");
        assert_eq!(index.lookup("ABC1", "red", "3Y").unwrap().code, "555");
        assert!(index.lookup("abc", "red", "3Y").is_none());
        assert!(index.lookup("A1", "Red", "2y").is_none());
    }

    #[test]
    fn missing_po_column_yields_none() {
        let ds = codes();
        let index = CodeIndex::build(columns(&ds, false), ds.row_count());
        assert_eq!(index.lookup("A1", "red", "2Y").unwrap().purchase_order, None);
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        let ds = codes();
        let cols = columns(&ds, true);
        let index = CodeIndex::build(cols, ds.row_count());
        assert_eq!(index.len(), 5);
        for style in ["A1", "ABC", "ABC1", "Z9"] {
            for color in ["blue", "Blue", "RED", "green"] {
                for size in ["2Y", "3Y"] {
                    let indexed = index.lookup(style, color, size).map(|m| m.row);
                    assert_eq!(indexed, scan(cols, ds.row_count(), style, color, size));
                }
            }
        }
    }
}
