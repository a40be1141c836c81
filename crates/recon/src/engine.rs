use crate::aggregate::consolidate;
use crate::config::{CodeFields, PackingFields, ReconConfig};
use crate::dataset::{Column, Dataset};
use crate::error::ReconError;
use crate::evidence::{compute_summary, sample, CODE_SAMPLE_ROWS, PACKING_SAMPLE_ROWS, PACKING_SAMPLE_SIZES};
use crate::matcher::{CodeColumns, CodeIndex};
use crate::model::{
    ConsolidatedRow, ConsolidatedTable, Diagnostics, InputSamples, ReconMeta, ReconOutcome,
    ReconResult, UnmatchedLookup,
};
use crate::schema::{find_size_columns, resolve, LogicalField, ResolvedSchema, SchemaMapping};

/// Reconcile a packing dataset against a code dataset.
///
/// Schema problems fail before any row is read. Rows without a matching code
/// never fail the run; they are collected in `diagnostics.unmatched`.
pub fn reconcile(
    config: &ReconConfig,
    packing: &Dataset,
    codes: &Dataset,
) -> Result<ReconResult, ReconError> {
    let resolved = resolve_schema(config, packing, codes)?;
    log::info!(
        "resolved {} size column(s): {:?}",
        resolved.size_columns.len(),
        resolved.size_columns
    );

    let (rows, mut diagnostics) = match_rows(config, packing, codes, &resolved)?;
    if !diagnostics.unmatched.is_empty() {
        log::info!(
            "{} packing quantity cell(s) have no matching code",
            diagnostics.unmatched.len()
        );
    }
    let emitted = rows.len();

    let rows = consolidate(rows).map_err(|msg| processing_failure(msg, packing, codes))?;
    let table = ConsolidatedTable { rows };

    let outcome = if table.is_empty() {
        diagnostics.samples = Some(input_samples(packing, codes, &resolved));
        log::warn!(
            "nothing to consolidate: {} unmatched lookup(s), {} skipped quantity cell(s)",
            diagnostics.unmatched.len(),
            diagnostics.skipped_quantities
        );
        ReconOutcome::Empty
    } else {
        ReconOutcome::Consolidated
    };

    let summary = compute_summary(&table);
    log::info!(
        "consolidated {emitted} emitted row(s) into {} ({} units)",
        summary.rows,
        summary.total_units
    );

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        outcome,
        summary,
        resolved,
        table,
        diagnostics,
    })
}

/// Resolve both schemas and the size columns, failing on anything required.
pub fn resolve_schema(
    config: &ReconConfig,
    packing: &Dataset,
    codes: &Dataset,
) -> Result<ResolvedSchema, ReconError> {
    let code_schema = resolve(codes, &config.codes.candidates());
    require(&code_schema, &CodeFields::REQUIRED, codes)?;

    let packing_schema = resolve(packing, &config.packing.candidates());
    require(&packing_schema, &PackingFields::REQUIRED, packing)?;

    let size_columns = find_size_columns(packing, &config.size_tokens);
    if size_columns.is_empty() {
        return Err(ReconError::NoSizeColumnsFound {
            columns: packing.column_names(),
            tokens: config.size_tokens.clone(),
        });
    }

    Ok(ResolvedSchema {
        packing: packing_schema,
        codes: code_schema,
        size_columns,
    })
}

fn require(mapping: &SchemaMapping, fields: &[LogicalField], dataset: &Dataset) -> Result<(), ReconError> {
    let missing = mapping.missing(fields);
    if missing.is_empty() {
        return Ok(());
    }
    Err(ReconError::SchemaMismatch {
        dataset: dataset.name().to_string(),
        missing,
        columns: dataset.column_names(),
    })
}

fn processing_failure(message: String, packing: &Dataset, codes: &Dataset) -> ReconError {
    ReconError::ProcessingFailure {
        message,
        packing_columns: packing.column_names(),
        code_columns: codes.column_names(),
    }
}

/// Look a resolved column up again. Only fails if the mapping and the
/// dataset disagree.
fn column<'a>(
    dataset: &'a Dataset,
    mapping: &SchemaMapping,
    field: LogicalField,
    packing: &Dataset,
    codes: &Dataset,
) -> Result<Option<&'a Column>, ReconError> {
    let Some(name) = mapping.get(field) else {
        return Ok(None);
    };
    dataset.column(name).map(Some).ok_or_else(|| {
        processing_failure(
            format!("column '{name}' for {field} not found in '{}'", dataset.name()),
            packing,
            codes,
        )
    })
}

fn required_column<'a>(
    dataset: &'a Dataset,
    mapping: &SchemaMapping,
    field: LogicalField,
    packing: &Dataset,
    codes: &Dataset,
) -> Result<&'a Column, ReconError> {
    column(dataset, mapping, field, packing, codes)?.ok_or_else(|| {
        processing_failure(format!("{field} is not resolved in '{}'", dataset.name()), packing, codes)
    })
}

/// Walk packing rows x size columns and emit one row per matched positive
/// quantity. Output is not yet grouped.
fn match_rows(
    config: &ReconConfig,
    packing: &Dataset,
    codes: &Dataset,
    resolved: &ResolvedSchema,
) -> Result<(Vec<ConsolidatedRow>, Diagnostics), ReconError> {
    let code_map = &resolved.codes;
    let code_columns = CodeColumns {
        style: required_column(codes, code_map, LogicalField::Style, packing, codes)?,
        color: required_column(codes, code_map, LogicalField::Color, packing, codes)?,
        size: required_column(codes, code_map, LogicalField::Size, packing, codes)?,
        code: required_column(codes, code_map, LogicalField::Code, packing, codes)?,
        purchase_order: column(codes, code_map, LogicalField::PurchaseOrder, packing, codes)?,
    };
    let index = CodeIndex::build(code_columns, codes.row_count());
    if index.is_empty() {
        log::warn!("code reference '{}' has no rows", codes.name());
    } else {
        log::info!("indexed {} code row(s) from '{}'", index.len(), codes.name());
    }

    let pl_map = &resolved.packing;
    let style_col = required_column(packing, pl_map, LogicalField::Style, packing, codes)?;
    let color_col = required_column(packing, pl_map, LogicalField::Color, packing, codes)?;
    let desc_col = column(packing, pl_map, LogicalField::Description, packing, codes)?;
    let po_col = column(packing, pl_map, LogicalField::PurchaseOrder, packing, codes)?;

    let size_cols = resolved
        .size_columns
        .iter()
        .map(|name| {
            packing.column(name).ok_or_else(|| {
                processing_failure(format!("size column '{name}' not found"), packing, codes)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    let mut diagnostics = Diagnostics::default();

    for row in 0..packing.row_count() {
        let style = style_col.get(row).trimmed();
        let color = color_col.get(row).trimmed();
        let description = desc_col.map(|c| c.get(row).trimmed()).unwrap_or_default();
        let packing_po = po_col
            .map(|c| c.get(row))
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.trimmed())
            .unwrap_or_else(|| config.purchase_order_default.clone());

        for size_col in &size_cols {
            let cell = size_col.get(row);
            let quantity = cell.as_quantity();
            if quantity <= 0.0 {
                if !cell.is_empty() {
                    diagnostics.skipped_quantities += 1;
                }
                continue;
            }
            if quantity >= u64::MAX as f64 {
                return Err(processing_failure(
                    format!("quantity {quantity} out of range at row {row}, column '{}'", size_col.name),
                    packing,
                    codes,
                ));
            }

            // The header is the size label.
            let size = size_col.name.as_str();

            let Some(found) = index.lookup(&style, &color, size) else {
                log::debug!("no code for {style} | {color} | {size}");
                diagnostics.unmatched.push(UnmatchedLookup {
                    row,
                    style: style.clone(),
                    color: color.clone(),
                    size: size.to_string(),
                    quantity,
                });
                continue;
            };

            if found.candidates > 1 {
                diagnostics.ambiguous_lookups += 1;
                log::debug!(
                    "{} code rows for {style} | {color} | {size}, using row {}",
                    found.candidates,
                    found.row
                );
            }

            rows.push(ConsolidatedRow {
                code: found.code,
                style: style.clone(),
                description: description.clone(),
                color: color.clone(),
                size: size.to_string(),
                purchase_order: found.purchase_order.unwrap_or_else(|| packing_po.clone()),
                units: quantity.trunc() as u64,
            });
        }
    }

    Ok((rows, diagnostics))
}

fn input_samples(packing: &Dataset, codes: &Dataset, resolved: &ResolvedSchema) -> InputSamples {
    let mut packing_cols: Vec<&str> = [LogicalField::Style, LogicalField::Color]
        .iter()
        .filter_map(|f| resolved.packing.get(*f))
        .collect();
    packing_cols.extend(
        resolved
            .size_columns
            .iter()
            .take(PACKING_SAMPLE_SIZES)
            .map(|s| s.as_str()),
    );

    let code_cols: Vec<&str> = CodeFields::REQUIRED
        .iter()
        .filter_map(|f| resolved.codes.get(*f))
        .collect();

    InputSamples {
        packing: sample(packing, &packing_cols, PACKING_SAMPLE_ROWS),
        codes: sample(codes, &code_cols, CODE_SAMPLE_ROWS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Cell;

    fn text(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::from(*v)).collect()
    }

    fn nums(values: &[f64]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Number(*v)).collect()
    }

    fn one_code(style: &str, color: &str, size: &str, code: &str) -> Dataset {
        Dataset::new("codes")
            .with_column("Style", text(&[style]))
            .with_column("Color", text(&[color]))
            .with_column("Talla", text(&[size]))
            .with_column("UPC", text(&[code]))
    }

    #[test]
    fn repeated_size_header_is_read_once() {
        let packing = Dataset::from_rows(
            "packing",
            &["Style", "Color", "2Y", " 2Y"],
            vec![vec![Cell::text("A1"), Cell::text("Blue"), Cell::Number(3.0), Cell::Number(5.0)]],
        );
        let codes = one_code("A1", "Blue", "2Y", "000111222");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.resolved.size_columns, vec!["2Y", "2Y.1"]);
        assert_eq!(result.table.rows.len(), 1);
        assert_eq!(result.table.rows[0].units, 3);

        // The second block surfaces as its own unmatched size.
        assert_eq!(result.diagnostics.unmatched.len(), 1);
        assert_eq!(result.diagnostics.unmatched[0].size, "2Y.1");
        assert_eq!(result.diagnostics.unmatched[0].quantity, 5.0);
    }

    #[test]
    fn single_row_example() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", nums(&[3.0]))
            .with_column("3Y", nums(&[0.0]));
        let codes = one_code("A1", "blue", "2Y", "000111222");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.outcome, ReconOutcome::Consolidated);
        assert_eq!(
            result.table.rows,
            vec![ConsolidatedRow {
                code: "000111222".into(),
                style: "A1".into(),
                description: String::new(),
                color: "Blue".into(),
                size: "2Y".into(),
                purchase_order: "912".into(),
                units: 3,
            }]
        );
        assert_eq!(result.diagnostics.skipped_quantities, 1);
        assert!(result.diagnostics.unmatched.is_empty());
        assert!(result.diagnostics.samples.is_none());
    }

    #[test]
    fn negative_and_blank_quantities_emit_nothing() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1", "A1", "A1", "A1"]))
            .with_column("Color", text(&["Blue", "Blue", "Blue", "Blue"]))
            .with_column("2Y", vec![Cell::Number(-4.0), Cell::Empty, Cell::text("x"), Cell::text(" ")]);
        let codes = one_code("A1", "Blue", "2Y", "1");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert!(result.table.is_empty());
        assert_eq!(result.outcome, ReconOutcome::Empty);
        assert_eq!(result.diagnostics.skipped_quantities, 2);
        assert!(result.diagnostics.unmatched.is_empty());
    }

    #[test]
    fn unmatched_lookups_are_recorded() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1", "ZZ"]))
            .with_column("Color", text(&["Blue", "Blue"]))
            .with_column("2Y", nums(&[1.0, 2.0]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.table.len(), 1);
        assert_eq!(
            result.diagnostics.unmatched,
            vec![UnmatchedLookup {
                row: 1,
                style: "ZZ".into(),
                color: "Blue".into(),
                size: "2Y".into(),
                quantity: 2.0,
            }]
        );
    }

    #[test]
    fn empty_outcome_carries_samples() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1", "A2", "A3", "A4"]))
            .with_column("Color", text(&["Blue", "Red", "Red", "Red"]))
            .with_column("Desc", text(&["d", "d", "d", "d"]))
            .with_column("2Y", nums(&[1.0, 1.0, 1.0, 1.0]));
        let codes = one_code("B1", "Blue", "2Y", "1");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.outcome, ReconOutcome::Empty);
        assert_eq!(result.diagnostics.unmatched.len(), 4);
        let samples = result.diagnostics.samples.unwrap();
        assert_eq!(samples.packing.columns, vec!["Style", "Color", "2Y"]);
        assert_eq!(samples.packing.rows.len(), 3);
        assert_eq!(samples.codes.columns, vec!["Style", "Color", "Talla", "UPC"]);
        assert_eq!(samples.codes.rows, vec![vec!["B1", "Blue", "2Y", "1"]]);
    }

    #[test]
    fn missing_code_size_column_is_schema_mismatch() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", nums(&[3.0]));
        let codes = Dataset::new("codes")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("UPC", text(&["1"]));

        let err = reconcile(&ReconConfig::default(), &packing, &codes).unwrap_err();
        assert_eq!(
            err,
            ReconError::SchemaMismatch {
                dataset: "codes".into(),
                missing: vec![LogicalField::Size],
                columns: vec!["Style".into(), "Color".into(), "UPC".into()],
            }
        );
    }

    #[test]
    fn missing_packing_color_is_schema_mismatch() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("2Y", nums(&[3.0]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let err = reconcile(&ReconConfig::default(), &packing, &codes).unwrap_err();
        assert!(matches!(
            err,
            ReconError::SchemaMismatch { ref dataset, ref missing, .. }
                if dataset == "packing" && missing == &vec![LogicalField::Color]
        ));
    }

    #[test]
    fn no_size_columns() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("Qty", nums(&[3.0]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let err = reconcile(&ReconConfig::default(), &packing, &codes).unwrap_err();
        assert_eq!(err.kind(), "no_size_columns_found");
    }

    #[test]
    fn fractional_quantities_truncate() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", text(&["4.9"]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.table.rows[0].units, 4);
    }

    #[test]
    fn huge_quantity_is_processing_failure() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", nums(&[1e30]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let err = reconcile(&ReconConfig::default(), &packing, &codes).unwrap_err();
        match err {
            ReconError::ProcessingFailure { packing_columns, code_columns, .. } => {
                assert_eq!(packing_columns, vec!["Style", "Color", "2Y"]);
                assert_eq!(code_columns, vec!["Style", "Color", "Talla", "UPC"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn packing_po_used_when_codes_have_none() {
        let packing = Dataset::new("packing")
            .with_column("PO #", text(&["4500123", ""]))
            .with_column("Style", text(&["A1", "A1"]))
            .with_column("Color", text(&["Blue", "Blue"]))
            .with_column("2Y", nums(&[1.0, 2.0]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        let pos: Vec<&str> = result.table.rows.iter().map(|r| r.purchase_order.as_str()).collect();
        assert_eq!(pos, vec!["4500123", "912"]);
    }

    #[test]
    fn code_po_wins_over_packing_po() {
        let packing = Dataset::new("packing")
            .with_column("PO", text(&["4500123"]))
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", nums(&[1.0]));
        let codes = one_code("A1", "Blue", "2Y", "1").with_column("Order", text(&["PO-77"]));

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.table.rows[0].purchase_order, "PO-77");
    }

    #[test]
    fn configured_default_purchase_order() {
        let config = ReconConfig {
            purchase_order_default: "N/A".into(),
            ..ReconConfig::default()
        };
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", nums(&[1.0]));
        let codes = one_code("A1", "Blue", "2Y", "1");

        let result = reconcile(&config, &packing, &codes).unwrap();
        assert_eq!(result.table.rows[0].purchase_order, "N/A");
    }

    #[test]
    fn ambiguous_lookups_are_counted() {
        let packing = Dataset::new("packing")
            .with_column("Style", text(&["A1"]))
            .with_column("Color", text(&["Blue"]))
            .with_column("2Y", nums(&[1.0]));
        let codes = Dataset::new("codes")
            .with_column("Style", text(&["A1", "A1"]))
            .with_column("Color", text(&["BLUE", "blue"]))
            .with_column("Size", text(&["2Y", "2Y"]))
            .with_column("UPC", text(&["first", "second"]));

        let result = reconcile(&ReconConfig::default(), &packing, &codes).unwrap();
        assert_eq!(result.table.rows[0].code, "first");
        assert_eq!(result.diagnostics.ambiguous_lookups, 1);
    }
}
