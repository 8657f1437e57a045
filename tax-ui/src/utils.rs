use rust_decimal::Decimal;
use tax_core::SavingsEfficiency;
use tax_core::calculations::common::{round_half_up, round_to};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into an optional [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`). Returns `Ok(None)` for empty or whitespace-only input so callers can
/// substitute a default, and an error (logged) for anything unparseable.
pub fn parse_amount(s: &str) -> Result<Option<Decimal>, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized.parse().map(Some).map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats an amount with thousands separators, rounded half-up to
/// `decimal_places`.
pub fn format_amount(
    value: Decimal,
    decimal_places: u32,
) -> String {
    let rounded = round_to(value, decimal_places);
    let text = format!("{:.*}", decimal_places as usize, rounded.abs());
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };

    match text.split_once('.') {
        Some((whole, fraction)) => format!("{sign}{}.{fraction}", group_thousands(whole)),
        None => format!("{sign}{}", group_thousands(&text)),
    }
}

/// Formats a chart axis value as a whole number with thousands separators.
pub fn format_axis_value(value: f64) -> String {
    let whole = format!("{:.0}", value.trunc().abs());
    let sign = if value <= -1.0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&whole))
}

/// Formats a fraction as a percentage with two decimal places.
pub fn format_percent(ratio: Decimal) -> String {
    format!("{:.2}%", round_half_up(ratio * Decimal::ONE_HUNDRED))
}

/// Formats a savings efficiency, spelling out the undefined case.
pub fn format_efficiency(efficiency: &SavingsEfficiency) -> String {
    match efficiency {
        SavingsEfficiency::Ratio(ratio) => format_percent(*ratio),
        SavingsEfficiency::Undefined => "undefined".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_amount_accepts_comma_thousands_separator() {
        assert_eq!(parse_amount("1,234.56").unwrap(), Some(dec!(1234.56)));
        assert_eq!(parse_amount("1,234,567.89").unwrap(), Some(dec!(1234567.89)));
    }

    #[test]
    fn parse_amount_trims_whitespace() {
        assert_eq!(parse_amount("  123.45  ").unwrap(), Some(dec!(123.45)));
        assert_eq!(parse_amount("   ").unwrap(), None);
    }

    #[test]
    fn parse_amount_invalid_returns_error() {
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn parse_amount_distinguishes_empty_from_zero() {
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount("0").unwrap(), Some(Decimal::ZERO));
        assert_eq!(parse_amount("-500").unwrap(), Some(dec!(-500)));
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(dec!(50000), 0), "50,000");
        assert_eq!(format_amount(dec!(100000000), 0), "100,000,000");
        assert_eq!(format_amount(dec!(746), 0), "746");
    }

    #[test]
    fn format_amount_rounds_half_up() {
        assert_eq!(format_amount(dec!(153.5), 0), "154");
        assert_eq!(format_amount(dec!(1234.565), 2), "1,234.57");
    }

    #[test]
    fn format_amount_pads_decimal_places() {
        assert_eq!(format_amount(dec!(900.000), 2), "900.00");
        assert_eq!(format_amount(Decimal::ZERO, 0), "0");
    }

    #[test]
    fn format_amount_keeps_sign() {
        assert_eq!(format_amount(dec!(-1234), 0), "-1,234");
    }

    #[test]
    fn format_axis_value_truncates() {
        assert_eq!(format_axis_value(75000.9), "75,000");
        assert_eq!(format_axis_value(0.0), "0");
    }

    #[test]
    fn format_percent_two_places() {
        assert_eq!(format_percent(dec!(0.0334529)), "3.35%");
        assert_eq!(format_percent(dec!(0.22)), "22.00%");
    }

    #[test]
    fn format_efficiency_undefined() {
        assert_eq!(format_efficiency(&SavingsEfficiency::Undefined), "undefined");
        assert_eq!(format_efficiency(&SavingsEfficiency::Ratio(Decimal::ZERO)), "0.00%");
    }
}
