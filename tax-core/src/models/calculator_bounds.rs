use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input limits for the calculator form.
///
/// Values outside the limits are clamped rather than rejected. The defaults
/// match the public calculator: income between 1,000 and 100,000,000 in
/// steps of 1,000, deductions up to 100,000,000 in steps of 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorBounds {
    pub min_income: Decimal,
    pub max_income: Decimal,
    pub default_income: Decimal,
    pub income_step: Decimal,

    pub min_deduction: Decimal,
    pub max_deduction: Decimal,
    pub default_deduction: Decimal,
    pub deduction_step: Decimal,
}

impl Default for CalculatorBounds {
    fn default() -> Self {
        Self {
            min_income: Decimal::from(1_000),
            max_income: Decimal::from(100_000_000),
            default_income: Decimal::from(50_000),
            income_step: Decimal::from(1_000),
            min_deduction: Decimal::ZERO,
            max_deduction: Decimal::from(100_000_000),
            default_deduction: Decimal::from(22_300),
            deduction_step: Decimal::from(100),
        }
    }
}

impl CalculatorBounds {
    /// Clamps `income` into `[min_income, max_income]`, never below zero.
    pub fn clamp_income(
        &self,
        income: Decimal,
    ) -> Decimal {
        clamp(income, self.min_income, self.max_income)
    }

    /// Clamps `deduction` into `[min_deduction, max_deduction]`, never below zero.
    pub fn clamp_deduction(
        &self,
        deduction: Decimal,
    ) -> Decimal {
        clamp(deduction, self.min_deduction, self.max_deduction)
    }
}

fn clamp(
    value: Decimal,
    min: Decimal,
    max: Decimal,
) -> Decimal {
    let floor = min.max(Decimal::ZERO);
    value.max(floor).min(max.max(floor))
}
