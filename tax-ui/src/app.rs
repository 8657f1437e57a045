use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::{CalculatorBounds, CurvePoint, EngineError, TaxEngine, TaxQuery, TaxResult};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ChartConfig;
use crate::csv_loader::BatchRow;
use crate::report::LabelledResult;
use crate::utils::{ParseDecimalError, parse_amount};

/// Errors raised while turning form input into a query.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{field} must be a valid number")]
    InvalidNumber {
        field: &'static str,
        #[source]
        source: ParseDecimalError,
    },
}

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculatorForm {
    pub income: String,
    pub deduction: String,
}

impl CalculatorForm {
    pub fn new(
        income: impl Into<String>,
        deduction: impl Into<String>,
    ) -> Self {
        Self {
            income: income.into(),
            deduction: deduction.into(),
        }
    }

    /// Parses the form into a query.
    ///
    /// Empty fields take the bound's default. Values outside the bounds are
    /// clamped to the nearest limit, never rejected.
    pub fn validate(
        &self,
        bounds: &CalculatorBounds,
    ) -> Result<TaxQuery, FormError> {
        let income = parse_field("Assessable income", &self.income)?
            .unwrap_or(bounds.default_income);
        let deduction = parse_field("Planned deductions", &self.deduction)?
            .unwrap_or(bounds.default_deduction);

        Ok(clamp_query(bounds, income, deduction))
    }
}

fn parse_field(
    field: &'static str,
    value: &str,
) -> Result<Option<Decimal>, FormError> {
    parse_amount(value).map_err(|source| FormError::InvalidNumber { field, source })
}

/// Errors raised while preparing a calculation for display.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("chart range {income} x {span} is too large")]
    ChartRangeOverflow { income: Decimal, span: Decimal },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Builds a query with both amounts clamped into `bounds`.
pub fn clamp_query(
    bounds: &CalculatorBounds,
    income: Decimal,
    deduction: Decimal,
) -> TaxQuery {
    let clamped_income = bounds.clamp_income(income);
    if clamped_income != income {
        warn!(%income, clamped = %clamped_income, "income outside bounds, clamped");
    }
    let clamped_deduction = bounds.clamp_deduction(deduction);
    if clamped_deduction != deduction {
        warn!(%deduction, clamped = %clamped_deduction, "deduction outside bounds, clamped");
    }
    TaxQuery::new(clamped_income, clamped_deduction)
}

/// Everything the presentation layer shows for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calculation {
    pub result: TaxResult,
    /// Tax payable over `[0, span * income]`, for the chart.
    pub curve: Vec<CurvePoint>,
}

/// Runs the engine for `query` and samples the chart curve.
pub fn calculate(
    engine: &TaxEngine<'_>,
    chart: &ChartConfig,
    query: &TaxQuery,
) -> Result<Calculation, CalculationError> {
    let result = engine.savings(query);

    let upper = result
        .income
        .checked_mul(chart.span)
        .ok_or(CalculationError::ChartRangeOverflow {
            income: result.income,
            span: chart.span,
        })?;
    let step = curve_step(upper, chart.step, chart.max_points);
    let curve = engine.tax_curve(upper, step)?;

    info!(
        income = %result.income,
        deduction = %result.deduction,
        tax_saved = %result.tax_saved,
        points = curve.len(),
        "calculation complete"
    );

    Ok(Calculation { result, curve })
}

/// Runs every batch row through the engine, keeping row labels.
pub fn calculate_batch(
    engine: &TaxEngine<'_>,
    rows: &[BatchRow],
) -> Vec<LabelledResult> {
    info!(rows = rows.len(), "running batch");
    rows.iter()
        .map(|row| LabelledResult {
            label: row.label.clone(),
            result: engine.savings(&row.query),
        })
        .collect()
}

/// Widens `step` so that `[0, upper]` is sampled with at most `max_points`
/// points (the end point is always added on top).
pub fn curve_step(
    upper: Decimal,
    step: Decimal,
    max_points: usize,
) -> Decimal {
    let intervals = Decimal::from(max_points.saturating_sub(1).max(1));
    let minimum = (upper / intervals).ceil();
    step.max(minimum)
}
