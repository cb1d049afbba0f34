//! Currency normalization of the salary column.

use serde_json::{Number, Value};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{cell_number, cell_text, Table};

use super::tables::CurrencyConversion;

/// Convert one amount: `round(amount * rate, decimals)`.
///
/// Ties round half away from zero (`f64::round`).
pub fn convert_amount(amount: f64, rate: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (amount * rate * scale).round() / scale
}

/// Convert every cell of the configured column.
///
/// Empty cells stay `null`. A cell that is not a number fails the whole
/// conversion with [`AnalysisError::InvalidNumber`].
pub fn normalize_currency(table: Table, conversion: &CurrencyConversion) -> AnalysisResult<Table> {
    let column = conversion.column.clone();

    table.map_column(&conversion.column, |row, cell| match cell_number(cell) {
        Ok(Some(amount)) => {
            let converted = convert_amount(amount, conversion.rate, conversion.decimals);
            Number::from_f64(converted)
                .map(Value::Number)
                .ok_or_else(|| invalid(row, &column, cell))
        }
        Ok(None) => Ok(Value::Null),
        Err(()) => Err(invalid(row, &column, cell)),
    })
}

fn invalid(row: usize, column: &str, cell: &Value) -> AnalysisError {
    AnalysisError::InvalidNumber {
        row: row + 1,
        column: column.to_string(),
        value: cell_text(cell).unwrap_or_default(),
    }
}
