use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single calculation request: an income and a planned deduction.
///
/// Both amounts are clamped to zero on construction, so a query never
/// carries a negative value into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxQuery {
    pub income: Decimal,
    pub deduction: Decimal,
}

impl TaxQuery {
    pub fn new(
        income: Decimal,
        deduction: Decimal,
    ) -> Self {
        Self {
            income: income.max(Decimal::ZERO),
            deduction: deduction.max(Decimal::ZERO),
        }
    }
}
