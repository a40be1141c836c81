use std::collections::BTreeMap;

use crate::model::{ConsolidatedRow, RowKey};

/// Sum `units` per full key, then order by (style, color, size).
///
/// Ties on the sort key keep `RowKey` order, so the output is fully
/// deterministic. Fails only when a sum would overflow `u64`.
pub fn consolidate(rows: Vec<ConsolidatedRow>) -> Result<Vec<ConsolidatedRow>, String> {
    let mut groups: BTreeMap<RowKey, u64> = BTreeMap::new();

    for row in rows {
        let units = row.units;
        let entry = groups.entry(row.key()).or_insert(0);
        *entry = entry.checked_add(units).ok_or_else(|| {
            format!(
                "unit total overflow for {} / {} / {}",
                row.style, row.color, row.size
            )
        })?;
    }

    let mut out: Vec<ConsolidatedRow> = groups
        .into_iter()
        .map(|(key, units)| ConsolidatedRow {
            code: key.code,
            style: key.style,
            description: key.description,
            color: key.color,
            size: key.size,
            purchase_order: key.purchase_order,
            units,
        })
        .collect();

    // Stable: equal (style, color, size) stay in key order.
    out.sort_by(|a, b| {
        (a.style.as_str(), a.color.as_str(), a.size.as_str())
            .cmp(&(b.style.as_str(), b.color.as_str(), b.size.as_str()))
    });

    Ok(out)
}
