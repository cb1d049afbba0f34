//! JSON Schema validation of the canonical survey table.
//!
//! The schema is derived from the translation tables in use: every looked-up
//! column must hold one of its canonical values, numeric columns must hold
//! non-negative numbers. Validation never rejects a table; it reports
//! warnings (typically answers the tables do not translate yet).
//!
//! # Example
//!
//! ```rust,ignore
//! use salary_survey::validation::{canonical_schema, validate};
//! use salary_survey::transform::TranslationTables;
//! use serde_json::json;
//!
//! let schema = canonical_schema(&TranslationTables::norwegian());
//! let record = json!({ "expertise": "software", "salary": 85706.42 });
//! assert!(validate(&schema, &record).is_ok());
//! ```

use serde_json::{json, Map, Value};

use crate::models::{columns, Table};
use crate::transform::tables::TranslationTables;

/// Default number of warnings reported for one table.
pub const MAX_WARNINGS: usize = 10;

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Simple true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Draft 7 schema for one canonical record.
pub fn canonical_schema(tables: &TranslationTables) -> Value {
    let mut properties = Map::new();

    let non_negative = json!({ "type": "number", "minimum": 0 });
    properties.insert(columns::EDUCATION.to_string(), non_negative.clone());
    properties.insert(columns::YEARS_OF_EXPERIENCE.to_string(), non_negative);
    properties.insert(columns::REGION.to_string(), json!({ "type": "string" }));
    properties.insert(
        tables.currency.column.clone(),
        json!({ "type": ["number", "null"], "minimum": 0 }),
    );

    for lookup in &tables.values {
        properties.insert(
            lookup.column.clone(),
            json!({ "type": "string", "enum": lookup.canonical_values() }),
        );
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Canonical survey response",
        "type": "object",
        "properties": properties,
    })
}

/// Check every cell of a canonical table against [`canonical_schema`].
///
/// Returns at most `limit` messages of the form
/// `Row 3, column 'expertise': ...`, followed by a count of the rest.
pub fn validate_canonical_table(
    table: &Table,
    tables: &TranslationTables,
    limit: usize,
) -> Vec<String> {
    let schema = canonical_schema(tables);
    let Some(properties) = schema["properties"].as_object() else {
        return Vec::new();
    };

    let mut validators = Vec::new();
    for (column, column_schema) in properties {
        let Some(idx) = table.column_index(column) else {
            continue;
        };
        match jsonschema::draft7::new(column_schema) {
            Ok(validator) => validators.push((idx, column.as_str(), validator)),
            Err(e) => return vec![format!("Invalid schema for '{}': {}", column, e)],
        }
    }

    let mut warnings = Vec::new();
    let mut total = 0usize;
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (idx, column, validator) in &validators {
            for error in validator.iter_errors(&row[*idx]) {
                total += 1;
                if warnings.len() < limit {
                    warnings.push(format!("Row {}, column '{}': {}", row_idx + 1, column, error));
                }
            }
        }
    }

    if total > warnings.len() {
        warnings.push(format!("... and {} more", total - warnings.len()));
    }
    warnings
}
