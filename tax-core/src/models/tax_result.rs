use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much of a deduction comes back as tax saved.
///
/// A zero deduction has no meaningful efficiency, so it is reported as
/// [`SavingsEfficiency::Undefined`] instead of a division by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsEfficiency {
    /// Tax saved divided by the deduction, as a fraction (0.05 = 5%).
    Ratio(Decimal),
    Undefined,
}

impl SavingsEfficiency {
    /// Computes `tax_saved / deduction`, or `Undefined` when the division
    /// has no result.
    pub fn from_savings(
        tax_saved: Decimal,
        deduction: Decimal,
    ) -> Self {
        if deduction.is_zero() {
            return Self::Undefined;
        }
        tax_saved
            .checked_div(deduction)
            .map_or(Self::Undefined, Self::Ratio)
    }

    pub fn ratio(&self) -> Option<Decimal> {
        match self {
            Self::Ratio(value) => Some(*value),
            Self::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Ratio(_))
    }
}

/// Before/after comparison for one [`TaxQuery`](crate::TaxQuery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Income as submitted (after clamping).
    pub income: Decimal,

    /// Deduction as submitted (after clamping).
    pub deduction: Decimal,

    /// `max(income - deduction, 0)`.
    pub adjusted_income: Decimal,

    /// Tax payable on `income`.
    pub tax_before_deduction: Decimal,

    /// Tax payable on `adjusted_income`.
    pub tax_after_deduction: Decimal,

    /// `tax_before_deduction - tax_after_deduction`, never negative.
    pub tax_saved: Decimal,

    pub savings_efficiency: SavingsEfficiency,

    /// Cumulative marginal rate that applies to the last unit of `income`.
    pub marginal_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn from_savings_divides_saved_by_deduction() {
        let efficiency = SavingsEfficiency::from_savings(dec!(500), dec!(10000));

        assert_eq!(efficiency, SavingsEfficiency::Ratio(dec!(0.05)));
        assert_eq!(efficiency.ratio(), Some(dec!(0.05)));
    }

    #[test]
    fn from_savings_is_undefined_for_zero_deduction() {
        let efficiency = SavingsEfficiency::from_savings(dec!(0), dec!(0));

        assert_eq!(efficiency, SavingsEfficiency::Undefined);
        assert!(!efficiency.is_defined());
        assert_eq!(efficiency.ratio(), None);
    }

    #[test]
    fn from_savings_is_zero_when_nothing_saved() {
        let efficiency = SavingsEfficiency::from_savings(dec!(0), dec!(7000));

        assert_eq!(efficiency, SavingsEfficiency::Ratio(Decimal::ZERO));
        assert!(efficiency.is_defined());
    }

    #[test]
    fn efficiency_serializes_with_snake_case_tags() {
        let undefined = serde_json::to_string(&SavingsEfficiency::Undefined).unwrap();
        let ratio = serde_json::to_string(&SavingsEfficiency::Ratio(dec!(0.25))).unwrap();

        assert_eq!(undefined, "\"undefined\"");
        assert_eq!(ratio, "{\"ratio\":\"0.25\"}");
    }
}
