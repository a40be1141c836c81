use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

// ---------------------------------------------------------------------------
// Logical fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Style,
    Color,
    Size,
    Code,
    Description,
    PurchaseOrder,
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style => write!(f, "style"),
            Self::Color => write!(f, "color"),
            Self::Size => write!(f, "size"),
            Self::Code => write!(f, "code"),
            Self::Description => write!(f, "description"),
            Self::PurchaseOrder => write!(f, "purchase_order"),
        }
    }
}

/// A logical field plus the header fragments that identify it, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidates {
    pub field: LogicalField,
    pub candidates: Vec<String>,
}

impl FieldCandidates {
    pub fn new(field: LogicalField, candidates: &[String]) -> Self {
        Self {
            field,
            candidates: candidates.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Logical field -> real column name, or `None` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SchemaMapping {
    fields: BTreeMap<LogicalField, Option<String>>,
}

impl SchemaMapping {
    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.fields.get(&field).and_then(|c| c.as_deref())
    }

    /// Required fields that did not resolve, in the order asked for.
    pub fn missing(&self, required: &[LogicalField]) -> Vec<LogicalField> {
        required
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, Option<&str>)> {
        self.fields.iter().map(|(f, c)| (*f, c.as_deref()))
    }
}

/// First column whose lower-cased name contains a candidate. Candidates are
/// tried in order, and for each candidate the columns in order.
pub fn find_column<'a, I>(columns: I, candidates: &[String]) -> Option<String>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    for candidate in candidates {
        let needle = candidate.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        for column in columns.clone() {
            if column.to_lowercase().contains(&needle) {
                return Some(column.to_string());
            }
        }
    }
    None
}

/// Resolve every logical field against the dataset's headers.
pub fn resolve(dataset: &Dataset, fields: &[FieldCandidates]) -> SchemaMapping {
    let names: Vec<&str> = dataset.columns().iter().map(|c| c.name.as_str()).collect();
    let mut mapping = SchemaMapping::default();
    for fc in fields {
        let column = find_column(names.iter().copied(), &fc.candidates);
        // A field listed twice keeps its first resolution.
        mapping.fields.entry(fc.field).or_insert(column);
    }
    mapping
}

/// Columns whose upper-cased header contains any size token, in dataset order.
pub fn find_size_columns(dataset: &Dataset, tokens: &[String]) -> Vec<String> {
    let tokens: Vec<String> = tokens
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    dataset
        .columns()
        .iter()
        .filter(|c| {
            let upper = c.name.to_uppercase();
            tokens.iter().any(|t| upper.contains(t.as_str()))
        })
        .map(|c| c.name.clone())
        .collect()
}

/// Everything the engine resolved, kept on the result for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSchema {
    pub packing: SchemaMapping,
    pub codes: SchemaMapping,
    pub size_columns: Vec<String>,
}
