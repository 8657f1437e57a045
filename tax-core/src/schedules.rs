//! Built-in tax schedules.

use rust_decimal::Decimal;

use crate::{TaxBracket, TaxSchedule};

/// Bracket thresholds and rate increments for Singapore resident
/// individuals, year of assessment 2024 onwards. Rates are in basis points.
const SINGAPORE_RESIDENT: [(i64, i64); 11] = [
    (0, 0),
    (20_000, 200),
    (30_000, 150),
    (40_000, 350),
    (80_000, 450),
    (120_000, 350),
    (160_000, 300),
    (200_000, 100),
    (240_000, 50),
    (280_000, 50),
    (320_000, 200),
];

/// Resident income tax schedule for Singapore (YA2024 onwards).
///
/// The top marginal rate is 22% on chargeable income above 320,000.
pub fn singapore_resident() -> TaxSchedule {
    let brackets = SINGAPORE_RESIDENT
        .iter()
        .map(|&(threshold, basis_points)| {
            TaxBracket::new(Decimal::from(threshold), Decimal::new(basis_points, 4))
        })
        .collect();

    TaxSchedule::from_validated("Singapore resident (YA2024)", brackets)
}
