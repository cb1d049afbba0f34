//! Transformation module.
//!
//! Raw survey table to canonical table, and the pipeline on top:
//! - Tables: Column renames, value lookups, currency conversion (plain data)
//! - Rename: Original column names to canonical names
//! - Translate: Categorical values to canonical values
//! - Currency: Salary conversion and rounding
//! - Pipeline: Parse, canonicalize, validate, summarize, report

pub mod currency;
pub mod pipeline;
pub mod rename;
pub mod tables;
pub mod translate;

pub use currency::{convert_amount, normalize_currency};
pub use pipeline::*;
pub use rename::{missing_columns, rename_columns};
pub use tables::{
    ColumnRename, CurrencyConversion, TranslationTables, ValueTable, CONVERSION_DECIMALS,
    NOK_CONVERSION_RATE,
};
pub use translate::{translate_column, translate_values, untranslated_values};
