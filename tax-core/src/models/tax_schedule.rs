use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::TaxBracket;

/// Errors raised when a set of brackets does not form a valid schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxScheduleError {
    /// A schedule needs at least the zero bracket.
    #[error("tax schedule has no brackets")]
    Empty,

    /// The first bracket must start at zero income.
    #[error("first bracket must start at 0, got {0}")]
    FirstThresholdNotZero(Decimal),

    /// Thresholds must be strictly increasing.
    #[error("bracket threshold {current} does not exceed previous threshold {previous}")]
    ThresholdsNotIncreasing { previous: Decimal, current: Decimal },

    /// Rate increments must be non-negative.
    #[error("bracket at {threshold} has negative rate {rate}")]
    NegativeRate { threshold: Decimal, rate: Decimal },

    /// The running marginal rate must not exceed 100%.
    #[error("marginal rate {rate} above {threshold} exceeds 1")]
    MarginalRateAboveOne { threshold: Decimal, rate: Decimal },
}

/// An immutable, validated marginal-rate schedule.
///
/// Brackets are ordered by threshold, the first threshold is zero, and each
/// bracket's rate is the increment over the previous bracket's marginal
/// rate. Tax on an income is therefore the sum over brackets of
/// `max(income - threshold, 0) * rate`.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::{TaxBracket, TaxSchedule};
///
/// let schedule = TaxSchedule::new(
///     "example",
///     vec![
///         TaxBracket::new(dec!(0), dec!(0)),
///         TaxBracket::new(dec!(20000), dec!(0.02)),
///         TaxBracket::new(dec!(30000), dec!(0.015)),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(schedule.top_marginal_rate(), dec!(0.035));
/// assert_eq!(schedule.marginal_rate_at(dec!(25000)), dec!(0.02));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSchedule {
    name: String,
    brackets: Vec<TaxBracket>,
}

impl TaxSchedule {
    /// Validates `brackets` and builds a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`TaxScheduleError`] if:
    /// - `brackets` is empty
    /// - the first threshold is not zero
    /// - thresholds are not strictly increasing
    /// - any rate is negative
    /// - the cumulative marginal rate exceeds 1
    pub fn new(
        name: impl Into<String>,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, TaxScheduleError> {
        let first = brackets.first().ok_or(TaxScheduleError::Empty)?;
        if !first.threshold.is_zero() {
            return Err(TaxScheduleError::FirstThresholdNotZero(first.threshold));
        }

        for pair in brackets.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(TaxScheduleError::ThresholdsNotIncreasing {
                    previous: pair[0].threshold,
                    current: pair[1].threshold,
                });
            }
        }

        let mut marginal = Decimal::ZERO;
        for bracket in &brackets {
            if bracket.rate < Decimal::ZERO {
                return Err(TaxScheduleError::NegativeRate {
                    threshold: bracket.threshold,
                    rate: bracket.rate,
                });
            }
            marginal = marginal.saturating_add(bracket.rate);
            if marginal > Decimal::ONE {
                return Err(TaxScheduleError::MarginalRateAboveOne {
                    threshold: bracket.threshold,
                    rate: marginal,
                });
            }
        }

        Ok(Self::from_validated(name, brackets))
    }

    /// Builds a schedule from brackets already known to be valid.
    pub(crate) fn from_validated(
        name: impl Into<String>,
        brackets: Vec<TaxBracket>,
    ) -> Self {
        Self {
            name: name.into(),
            brackets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Returns `(threshold, cumulative marginal rate)` for each bracket.
    ///
    /// This is the form tax authorities usually publish: the rate that
    /// applies to each additional unit of income inside the bracket.
    pub fn marginal_rates(&self) -> Vec<(Decimal, Decimal)> {
        self.brackets
            .iter()
            .scan(Decimal::ZERO, |marginal, bracket| {
                *marginal += bracket.rate;
                Some((bracket.threshold, *marginal))
            })
            .collect()
    }

    /// Marginal rate applied to income just above `income`.
    ///
    /// A bracket applies once income exceeds its threshold, so an income
    /// sitting exactly on a threshold still pays the lower rate.
    pub fn marginal_rate_at(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .filter(|b| income > b.threshold)
            .map(|b| b.rate)
            .sum()
    }

    pub fn top_marginal_rate(&self) -> Decimal {
        self.brackets.iter().map(|b| b.rate).sum()
    }
}
