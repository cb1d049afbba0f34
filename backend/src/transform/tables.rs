//! Translation tables: column renames, categorical value lookups and the
//! currency conversion applied to the survey.
//!
//! Tables are plain data. They are built once (from the built-in Norwegian
//! survey layout or from a JSON file) and passed by reference to every stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigResult;
use crate::models::{columns, Bonus, Category, EmploymentType, Expertise, Gender};

/// NOK to normalized currency unit.
pub const NOK_CONVERSION_RATE: f64 = 0.085706417;

/// Decimal digits kept after conversion.
pub const CONVERSION_DECIMALS: u32 = 2;

/// Every translation applied to a raw survey table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTables {
    /// Version of the table format
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Column renames, applied in order
    pub columns: Vec<ColumnRename>,

    /// Value lookups, one per categorical column (canonical column name)
    pub values: Vec<ValueTable>,

    /// Currency conversion for the salary column
    pub currency: CurrencyConversion,
}

/// One original → canonical column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

/// Raw → canonical values for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    /// Canonical column name the lookup applies to
    pub column: String,
    pub mapping: BTreeMap<String, String>,
}

/// Multiply a column by a fixed rate and round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    /// Canonical column name holding amounts
    pub column: String,
    pub rate: f64,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_decimals() -> u32 {
    CONVERSION_DECIMALS
}

impl TranslationTables {
    /// Built-in tables for the Norwegian salary survey.
    pub fn norwegian() -> Self {
        let renames = [
            ("kjønn", columns::GENDER),
            ("utdanning", columns::EDUCATION),
            ("erfaring", columns::YEARS_OF_EXPERIENCE),
            ("arbeidssted", columns::REGION),
            ("arbeidssituasjon", columns::EMPLOYMENT_TYPE),
            ("fag", columns::EXPERTISE),
            ("lønn", columns::SALARY),
        ];

        Self {
            version: default_version(),
            description: "Norwegian developer salary survey".to_string(),
            columns: renames
                .iter()
                .map(|(from, to)| ColumnRename {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
            values: vec![
                ValueTable::for_category::<Bonus>(columns::BONUS),
                ValueTable::for_category::<Gender>(columns::GENDER),
                ValueTable::for_category::<Expertise>(columns::EXPERTISE),
                ValueTable::for_category::<EmploymentType>(columns::EMPLOYMENT_TYPE),
            ],
            currency: CurrencyConversion {
                column: columns::SALARY.to_string(),
                rate: NOK_CONVERSION_RATE,
                decimals: CONVERSION_DECIMALS,
            },
        }
    }

    /// Parse tables from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse tables from a JSON value
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    /// Load tables from a JSON file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Original column names the input must provide.
    pub fn required_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.from.as_str()).collect()
    }

    /// Canonical name for an original column, if it is renamed.
    pub fn canonical_column(&self, original: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.from == original)
            .map(|c| c.to.as_str())
    }

    /// Value lookup for a canonical column.
    pub fn value_table(&self, column: &str) -> Option<&ValueTable> {
        self.values.iter().find(|v| v.column == column)
    }
}

impl Default for TranslationTables {
    fn default() -> Self {
        Self::norwegian()
    }
}

impl ValueTable {
    /// Lookup from every source label of a category to its canonical label.
    pub fn for_category<C: Category>(column: &str) -> Self {
        Self {
            column: column.to_string(),
            mapping: C::ALL
                .iter()
                .map(|c| (c.source_label().to_string(), c.label().to_string()))
                .collect(),
        }
    }

    /// Canonical value for a raw value, or `None` if not in the table.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.mapping.get(raw).map(String::as_str)
    }

    /// The set of canonical values this table produces.
    pub fn canonical_values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self.mapping.values().map(String::as_str).collect();
        values.sort_unstable();
        values.dedup();
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norwegian_tables_shape() {
        let tables = TranslationTables::norwegian();
        assert_eq!(tables.columns.len(), 7);
        assert_eq!(tables.value_table("expertise").unwrap().mapping.len(), 10);
        assert_eq!(
            tables.value_table("employment type and sector").unwrap().mapping.len(),
            4
        );
        assert_eq!(tables.value_table("gender").unwrap().mapping.len(), 3);
        assert_eq!(tables.value_table("bonus?").unwrap().mapping.len(), 2);
        assert_eq!(tables.currency.rate, 0.085706417);
        assert_eq!(tables.currency.decimals, 2);
    }

    #[test]
    fn test_fixed_lookups() {
        let tables = TranslationTables::norwegian();
        let gender = tables.value_table("gender").unwrap();
        assert_eq!(gender.lookup("mann"), Some("male"));
        assert_eq!(gender.lookup("kvinne"), Some("female"));
        assert_eq!(
            gender.lookup("annet / ønsker ikke oppgi"),
            Some("other / do not wish to specify")
        );

        let bonus = tables.value_table("bonus?").unwrap();
        assert_eq!(bonus.lookup("Ja"), Some("Yes"));
        assert_eq!(bonus.lookup("Nei"), Some("No"));

        let expertise = tables.value_table("expertise").unwrap();
        assert_eq!(expertise.lookup("sikkerhet"), Some("safety"));
        assert_eq!(expertise.lookup("AI / maskinlæring"), Some("AI / machine learning"));

        let employment = tables.value_table("employment type and sector").unwrap();
        assert_eq!(employment.lookup("konsulent"), Some("consultant"));
    }

    #[test]
    fn test_canonical_column() {
        let tables = TranslationTables::norwegian();
        assert_eq!(tables.canonical_column("lønn"), Some("salary"));
        assert_eq!(tables.canonical_column("bonus?"), None);
        assert!(tables.required_columns().contains(&"arbeidssted"));
    }

    #[test]
    fn test_json_roundtrip_and_defaults() {
        let tables = TranslationTables::norwegian();
        let parsed = TranslationTables::from_json(&tables.to_json().unwrap()).unwrap();
        assert_eq!(parsed, tables);

        let minimal = serde_json::json!({
            "columns": [{ "from": "pay", "to": "salary" }],
            "values": [],
            "currency": { "column": "salary", "rate": 1.0 }
        });
        let parsed = TranslationTables::from_value(&minimal).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.currency.decimals, 2);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, TranslationTables::norwegian().to_json().unwrap()).unwrap();

        let loaded = TranslationTables::from_file(&path).unwrap();
        assert_eq!(loaded.columns.len(), 7);
        assert!(TranslationTables::from_file(&dir.path().join("missing.json")).is_err());
    }
}
