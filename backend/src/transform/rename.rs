//! Column renaming: original survey names to canonical English names.

use crate::error::SchemaError;
use crate::models::Table;

use super::tables::TranslationTables;

/// Rename every known original column to its canonical name.
///
/// Unknown columns are kept verbatim. A rename entry is satisfied when the
/// original column is present, or when the canonical one already is, so a
/// second pass over a renamed table changes nothing. Fails on the first entry
/// that has neither, or that has both.
pub fn rename_columns(mut table: Table, tables: &TranslationTables) -> Result<Table, SchemaError> {
    for rename in &tables.columns {
        if rename.from != rename.to
            && table.has_column(&rename.from)
            && table.has_column(&rename.to)
        {
            return Err(SchemaError::DuplicateColumn {
                from: rename.from.clone(),
                to: rename.to.clone(),
            });
        }
        if table.rename_column(&rename.from, &rename.to) {
            continue;
        }
        if !table.has_column(&rename.to) {
            return Err(SchemaError::MissingColumn(rename.from.clone()));
        }
    }
    Ok(table)
}

/// Original columns of `tables` absent from `headers` (under either name).
pub fn missing_columns<'a>(headers: &[String], tables: &'a TranslationTables) -> Vec<&'a str> {
    tables
        .columns
        .iter()
        .filter(|c| !headers.iter().any(|h| *h == c.from || *h == c.to))
        .map(|c| c.from.as_str())
        .collect()
}
