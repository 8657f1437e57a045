//! Tiered marginal tax engine.
//!
//! Tax payable is the sum over every bracket of
//! `max(income - threshold, 0) * rate`, where each bracket's rate is the
//! increment over the previous bracket's marginal rate. Every term is
//! non-negative and non-decreasing in income, so the total is as well.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{SavingsEfficiency, TaxBracket, TaxEngine, TaxQuery, TaxSchedule};
//!
//! let schedule = TaxSchedule::new(
//!     "example",
//!     vec![
//!         TaxBracket::new(dec!(0), dec!(0)),
//!         TaxBracket::new(dec!(20000), dec!(0.02)),
//!         TaxBracket::new(dec!(30000), dec!(0.015)),
//!     ],
//! )
//! .unwrap();
//!
//! let engine = TaxEngine::new(&schedule);
//! let result = engine.savings(&TaxQuery::new(dec!(50000), dec!(22300)));
//!
//! assert_eq!(result.tax_before_deduction, dec!(900));
//! assert_eq!(result.tax_after_deduction, dec!(154));
//! assert_eq!(result.tax_saved, dec!(746));
//! assert!(matches!(result.savings_efficiency, SavingsEfficiency::Ratio(_)));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::calculations::common::non_negative;
use crate::{SavingsEfficiency, TaxQuery, TaxResult, TaxSchedule};

/// Errors from curve sampling. Tax and savings calculations never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("curve step must be positive, got {0}")]
    InvalidCurveStep(Decimal),

    #[error("curve upper bound must be non-negative, got {0}")]
    NegativeUpperBound(Decimal),
}

/// A sampled point on the tax curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub income: Decimal,
    pub tax: Decimal,
}

/// Total tax payable on `income` under `schedule`.
///
/// Negative income is taxed as zero. Thresholds are never negative and
/// the rates sum to at most one, so no term or partial sum can exceed
/// `income` and the function is total over every [`Decimal`].
pub fn compute_tax(
    schedule: &TaxSchedule,
    income: Decimal,
) -> Decimal {
    let income = non_negative(income);
    schedule
        .brackets()
        .iter()
        .map(|bracket| non_negative(income - bracket.threshold) * bracket.rate)
        .sum()
}

/// Tax before and after subtracting `deduction` from `income`.
///
/// Negative inputs are clamped to zero.
pub fn compute_savings(
    schedule: &TaxSchedule,
    income: Decimal,
    deduction: Decimal,
) -> TaxResult {
    TaxEngine::new(schedule).savings(&TaxQuery::new(income, deduction))
}

/// Calculator bound to one schedule.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    schedule: &'a TaxSchedule,
}

impl<'a> TaxEngine<'a> {
    pub fn new(schedule: &'a TaxSchedule) -> Self {
        Self { schedule }
    }

    /// Tax payable on `income`. See [`compute_tax`].
    pub fn tax_payable(
        &self,
        income: Decimal,
    ) -> Decimal {
        compute_tax(self.schedule, income)
    }

    /// Compares tax payable with and without the query's deduction.
    pub fn savings(
        &self,
        query: &TaxQuery,
    ) -> TaxResult {
        let income = non_negative(query.income);
        let deduction = non_negative(query.deduction);
        let adjusted_income = non_negative(income - deduction);

        let tax_before_deduction = self.tax_payable(income);
        let tax_after_deduction = self.tax_payable(adjusted_income);
        let tax_saved = non_negative(tax_before_deduction - tax_after_deduction);
        let savings_efficiency = SavingsEfficiency::from_savings(tax_saved, deduction);

        debug!(
            schedule = self.schedule.name(),
            %income,
            %deduction,
            %tax_before_deduction,
            %tax_after_deduction,
            %tax_saved,
            "computed tax savings"
        );

        TaxResult {
            income,
            deduction,
            adjusted_income,
            tax_before_deduction,
            tax_after_deduction,
            tax_saved,
            savings_efficiency,
            marginal_rate: self.schedule.marginal_rate_at(income),
        }
    }

    /// Samples the tax curve at `0, step, 2*step, ...` up to `upper`.
    ///
    /// `upper` itself is always the last point, even when it is not a
    /// multiple of `step`. Sampling stops early if the next point would
    /// overflow.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if `step` is not positive or `upper` is
    /// negative.
    pub fn tax_curve(
        &self,
        upper: Decimal,
        step: Decimal,
    ) -> Result<Vec<CurvePoint>, EngineError> {
        if step <= Decimal::ZERO {
            return Err(EngineError::InvalidCurveStep(step));
        }
        if upper < Decimal::ZERO {
            return Err(EngineError::NegativeUpperBound(upper));
        }

        let mut points = Vec::new();
        let mut income = Decimal::ZERO;
        while income < upper {
            points.push(self.point(income));
            income = match income.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        points.push(self.point(upper));

        trace!(points = points.len(), %upper, %step, "sampled tax curve");
        Ok(points)
    }

    fn point(
        &self,
        income: Decimal,
    ) -> CurvePoint {
        CurvePoint {
            income,
            tax: self.tax_payable(income),
        }
    }
}
