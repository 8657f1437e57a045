use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tier of a marginal schedule.
///
/// `rate` is the increment added to the marginal rate for income above
/// `threshold`, not the bracket's total marginal rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        threshold: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { threshold, rate }
    }
}
