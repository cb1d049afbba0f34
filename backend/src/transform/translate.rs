//! Categorical value translation.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::models::{cell_text, Table};

use super::tables::{TranslationTables, ValueTable};

/// Replace every categorical cell with its canonical value.
///
/// Values missing from a lookup pass through unchanged, and lookups whose
/// column is not in the table are skipped.
pub fn translate_values(table: Table, tables: &TranslationTables) -> Table {
    tables
        .values
        .iter()
        .fold(table, |table, lookup| translate_column(table, lookup))
}

/// Apply one lookup to its column.
pub fn translate_column(mut table: Table, lookup: &ValueTable) -> Table {
    if let Some(idx) = table.column_index(&lookup.column) {
        for row in &mut table.rows {
            row[idx] = translate_cell(&row[idx], lookup);
        }
    }
    table
}

fn translate_cell(cell: &Value, lookup: &ValueTable) -> Value {
    match cell {
        Value::String(s) => match lookup.lookup(s.trim()) {
            Some(canonical) => Value::String(canonical.to_string()),
            None => cell.clone(),
        },
        _ => cell.clone(),
    }
}

/// Distinct non-empty values of each looked-up column that the lookup does
/// not produce, as `(column, value)` pairs in sorted order.
pub fn untranslated_values(table: &Table, tables: &TranslationTables) -> Vec<(String, String)> {
    let mut found = BTreeSet::new();

    for lookup in &tables.values {
        let canonical = lookup.canonical_values();
        if let Some(cells) = table.column(&lookup.column) {
            for text in cells.filter_map(cell_text) {
                if !canonical.contains(&text.as_str()) {
                    found.insert((lookup.column.clone(), text));
                }
            }
        }
    }

    found.into_iter().collect()
}
