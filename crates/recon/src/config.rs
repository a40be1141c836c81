use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::schema::{FieldCandidates, LogicalField};

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Every convention the consolidation depends on. An empty TOML document
/// yields the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub name: String,
    /// Purchase order used when neither input carries one.
    pub purchase_order_default: String,
    /// Size labels that mark a packing column as a quantity column.
    pub size_tokens: Vec<String>,
    pub packing: PackingFields,
    pub codes: CodeFields,
    pub sheets: SheetPatterns,
    pub export: ExportConfig,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "packing-list".into(),
            purchase_order_default: "912".into(),
            size_tokens: strings(&[
                "0/3M", "3/6M", "6/12M", "12/18M", "18/24M", "2Y", "3Y", "4Y", "5Y", "6Y", "7Y",
                "8Y", "10Y", "12Y", "14Y",
            ]),
            packing: PackingFields::default(),
            codes: CodeFields::default(),
            sheets: SheetPatterns::default(),
            export: ExportConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Header candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingFields {
    pub style: Vec<String>,
    pub color: Vec<String>,
    pub description: Vec<String>,
    pub purchase_order: Vec<String>,
}

impl Default for PackingFields {
    fn default() -> Self {
        Self {
            style: strings(&["style", "estilo", "style #"]),
            color: strings(&["color", "colour"]),
            description: strings(&["description", "desc"]),
            purchase_order: strings(&["po", "order"]),
        }
    }
}

impl PackingFields {
    pub const REQUIRED: [LogicalField; 2] = [LogicalField::Style, LogicalField::Color];

    pub fn candidates(&self) -> Vec<FieldCandidates> {
        vec![
            FieldCandidates::new(LogicalField::Style, &self.style),
            FieldCandidates::new(LogicalField::Color, &self.color),
            FieldCandidates::new(LogicalField::Description, &self.description),
            FieldCandidates::new(LogicalField::PurchaseOrder, &self.purchase_order),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeFields {
    pub style: Vec<String>,
    pub color: Vec<String>,
    pub size: Vec<String>,
    pub code: Vec<String>,
    pub purchase_order: Vec<String>,
}

impl Default for CodeFields {
    fn default() -> Self {
        Self {
            style: strings(&["style", "estilo", "style #"]),
            color: strings(&["color", "colour"]),
            size: strings(&["talla", "size", "tall"]),
            code: strings(&["upc", "code"]),
            purchase_order: strings(&["po", "order"]),
        }
    }
}

impl CodeFields {
    pub const REQUIRED: [LogicalField; 4] = [
        LogicalField::Style,
        LogicalField::Color,
        LogicalField::Size,
        LogicalField::Code,
    ];

    pub fn candidates(&self) -> Vec<FieldCandidates> {
        vec![
            FieldCandidates::new(LogicalField::Style, &self.style),
            FieldCandidates::new(LogicalField::Color, &self.color),
            FieldCandidates::new(LogicalField::Size, &self.size),
            FieldCandidates::new(LogicalField::Code, &self.code),
            FieldCandidates::new(LogicalField::PurchaseOrder, &self.purchase_order),
        ]
    }
}

// ---------------------------------------------------------------------------
// Sheets + Export
// ---------------------------------------------------------------------------

/// Upper-case fragments used to pick the two sheets out of a workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetPatterns {
    pub packing: Vec<String>,
    pub codes: Vec<String>,
}

impl Default for SheetPatterns {
    fn default() -> Self {
        Self {
            packing: strings(&["PL", "PACKING"]),
            codes: strings(&["UPC"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sheet_name: String,
    /// Download name without extension.
    pub file_stem: String,
    pub max_column_width: usize,
    pub column_padding: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Consolidated".into(),
            file_stem: "consolidado_packing_list".into(),
            max_column_width: 50,
            column_padding: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.size_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "size_tokens must contain at least one non-blank token".into(),
            ));
        }

        let required = [
            ("packing.style", &self.packing.style),
            ("packing.color", &self.packing.color),
            ("codes.style", &self.codes.style),
            ("codes.color", &self.codes.color),
            ("codes.size", &self.codes.size),
            ("codes.code", &self.codes.code),
        ];
        for (name, candidates) in required {
            if candidates.iter().all(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{name} needs at least one non-blank candidate"
                )));
            }
        }

        let sheet_patterns = [
            ("sheets.packing", &self.sheets.packing),
            ("sheets.codes", &self.sheets.codes),
        ];
        for (name, patterns) in sheet_patterns {
            if patterns.iter().all(|p| p.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{name} needs at least one non-blank pattern"
                )));
            }
        }

        if self.export.max_column_width == 0 {
            return Err(ReconError::ConfigValidation(
                "export.max_column_width must be greater than 0".into(),
            ));
        }

        if self.export.sheet_name.trim().is_empty() || self.export.file_stem.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "export.sheet_name and export.file_stem must not be blank".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
