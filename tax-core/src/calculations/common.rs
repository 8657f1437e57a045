//! Common utility functions for tax calculations.
//!
//! Rounding and clamping helpers shared by the engine and the
//! presentation layer.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    round_to(value, 2)
}

/// Rounds to `decimal_places` using half-up (away from zero) rounding.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_to;
///
/// assert_eq!(round_to(dec!(899.5), 0), dec!(900));
/// assert_eq!(round_to(dec!(0.0334529), 4), dec!(0.0335));
/// ```
pub fn round_to(
    value: Decimal,
    decimal_places: u32,
) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero when `value` is negative.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
