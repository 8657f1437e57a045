//! CSV loader for batch calculator input.
//!
//! ## CSV Format
//!
//! Headers are matched by name; column order does not matter.
//!
//! | Column      | Required | Type    | Notes                                  |
//! |-------------|----------|---------|----------------------------------------|
//! | `income`    | yes      | decimal | e.g. `50000`                           |
//! | `deduction` | no       | decimal | Leave the cell empty for no deduction  |
//! | `label`     | no       | string  | Free text shown with the row's report  |
//!
//! ### Example
//!
//! ```csv
//! label,income,deduction
//! cpf top-up,50000,7000
//! srs top-up,120000,15300
//! ```
//!
//! Amounts outside the calculator bounds are clamped, as on the form.
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{CalculatorBounds, TaxQuery};
use tracing::debug;

use crate::app::clamp_query;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    label: Option<String>,
    income: Decimal,
    #[serde(default)]
    deduction: Option<Decimal>,
}

/// One batch row: an optional label and its clamped query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub label: Option<String>,
    pub query: TaxQuery,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading batch input.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, type mismatch, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("cannot read batch file: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Parse CSV text and return one clamped row per record, in file order.
/// Blank labels are dropped.
pub fn load_from_str(
    input: &str,
    bounds: &CalculatorBounds,
) -> Result<Vec<BatchRow>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row: CsvRow = result?;
            debug!(row = idx + 1, label = row.label.as_deref().unwrap_or(""), "batch row");
            Ok(BatchRow {
                label: row.label.filter(|label| !label.is_empty()),
                query: clamp_query(
                    bounds,
                    row.income,
                    row.deduction.unwrap_or(Decimal::ZERO),
                ),
            })
        })
        .collect()
}

/// Convenience wrapper: read a file from disk and delegate to [load_from_str].
pub fn load_from_file(
    path: &Path,
    bounds: &CalculatorBounds,
) -> Result<Vec<BatchRow>, CsvLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents, bounds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const MINIMAL_CSV: &str = "\
income
50000
";

    const FULL_CSV: &str = "\
label,income,deduction
cpf,50000,7000
none,80000,
";

    #[test]
    fn test_minimal_csv_defaults_deduction_to_zero() {
        let rows = load_from_str(MINIMAL_CSV, &CalculatorBounds::default()).unwrap();

        assert_eq!(
            rows,
            vec![BatchRow {
                label: None,
                query: TaxQuery::new(dec!(50000), Decimal::ZERO),
            }]
        );
    }

    #[test]
    fn test_full_csv_rows_in_order() {
        let rows = load_from_str(FULL_CSV, &CalculatorBounds::default()).unwrap();

        assert_eq!(
            rows,
            vec![
                BatchRow {
                    label: Some("cpf".to_string()),
                    query: TaxQuery::new(dec!(50000), dec!(7000)),
                },
                BatchRow {
                    label: Some("none".to_string()),
                    query: TaxQuery::new(dec!(80000), Decimal::ZERO),
                },
            ]
        );
    }

    #[test]
    fn test_blank_label_is_dropped() {
        let csv = "label,income
,50000
";

        let rows = load_from_str(csv, &CalculatorBounds::default()).unwrap();

        assert_eq!(rows[0].label, None);
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "deduction,income\n22300,50000\n";

        let rows = load_from_str(csv, &CalculatorBounds::default()).unwrap();

        assert_eq!(rows[0].query, TaxQuery::new(dec!(50000), dec!(22300)));
    }

    #[test]
    fn test_out_of_bounds_values_are_clamped() {
        let csv = "income,deduction\n-100,-5\n";

        let rows = load_from_str(csv, &CalculatorBounds::default()).unwrap();

        assert_eq!(rows[0].query, TaxQuery::new(dec!(1000), Decimal::ZERO));
    }

    #[test]
    fn test_missing_income_column_is_parse_error() {
        let csv = "deduction\n100\n";

        let result = load_from_str(csv, &CalculatorBounds::default());

        assert!(matches!(result, Err(CsvLoadError::Parse(_))));
    }

    #[test]
    fn test_invalid_number_is_parse_error() {
        let csv = "income,deduction\nfifty,0\n";

        let result = load_from_str(csv, &CalculatorBounds::default());

        assert!(matches!(result, Err(CsvLoadError::Parse(_))));
    }

    #[test]
    fn test_header_only_is_empty() {
        let rows = load_from_str("income,deduction\n", &CalculatorBounds::default()).unwrap();

        assert!(rows.is_empty());
    }
}
