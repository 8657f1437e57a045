//! Tax curve chart.
//!
//! Draws tax payable against taxable income, with markers and guide lines
//! at the incomes before and after the deduction. Output is SVG.

use std::path::Path;

use plotters::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tax_core::{CurvePoint, TaxResult};
use thiserror::Error;
use tracing::info;

use crate::app::Calculation;
use crate::config::ChartConfig;
use crate::utils::{format_amount, format_axis_value};

pub const HEADLINE: &str = "You earn too much to be bothering about this!";

const BACKGROUND: RGBColor = RGBColor(0, 0, 0);
const FOREGROUND: RGBColor = RGBColor(255, 255, 255);
const CURVE: RGBColor = RGBColor(255, 215, 0);
const BEFORE: RGBColor = RGBColor(165, 42, 42);
const AFTER: RGBColor = RGBColor(0, 255, 127);
const GRID: RGBColor = RGBColor(128, 128, 128);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("cannot draw chart: {0}")]
    Draw(String),

    #[error("cannot write chart to '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Renders the chart for `calculation` as an SVG document.
pub fn render_svg(
    calculation: &Calculation,
    config: &ChartConfig,
) -> Result<String, ChartError> {
    let result = &calculation.result;
    let (x_max, y_max) = axis_limits(&calculation.curve, result);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height))
            .into_drawing_area();
        root.fill(&BACKGROUND).map_err(draw_err)?;

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80);
        if result.income > config.headline_income_threshold {
            builder.caption(HEADLINE, ("sans-serif", 22).into_font().color(&FOREGROUND));
        }
        let mut chart = builder
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Taxable Income")
            .y_desc("Tax Payable")
            .x_label_formatter(&|x| format_axis_value(*x))
            .y_label_formatter(&|y| format_axis_value(*y))
            .axis_style(FOREGROUND.stroke_width(1))
            .bold_line_style(GRID.mix(0.35).stroke_width(1))
            .light_line_style(GRID.mix(0.1).stroke_width(1))
            .label_style(("sans-serif", 14).into_font().color(&FOREGROUND))
            .axis_desc_style(("sans-serif", 16).into_font().color(&FOREGROUND))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                calculation
                    .curve
                    .iter()
                    .map(|p| (to_f64(p.income), to_f64(p.tax))),
                CURVE.stroke_width(3),
            ))
            .map_err(draw_err)?;

        let markers = [
            (
                result.income,
                result.tax_before_deduction,
                BEFORE,
                format!("Old Tax [{}]", format_amount(result.tax_before_deduction, 0)),
            ),
            (
                result.adjusted_income,
                result.tax_after_deduction,
                AFTER,
                format!("New Tax [{}]", format_amount(result.tax_after_deduction, 0)),
            ),
        ];

        for (income, tax, color, label) in markers {
            let (x, y) = (to_f64(income), to_f64(tax));

            chart
                .draw_series(LineSeries::new(
                    [(x, 0.0), (x, y_max)],
                    color.mix(0.6).stroke_width(1),
                ))
                .map_err(draw_err)?;
            chart
                .draw_series(LineSeries::new(
                    [(0.0, y), (x_max, y)],
                    color.mix(0.6).stroke_width(1),
                ))
                .map_err(draw_err)?;
            chart
                .draw_series(std::iter::once(Circle::new((x, y), 6, color.filled())))
                .map_err(draw_err)?
                .label(label)
                .legend(move |(lx, ly)| Circle::new((lx + 10, ly), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(BACKGROUND.mix(0.8).filled())
            .border_style(FOREGROUND.stroke_width(1))
            .label_font(("sans-serif", 14).into_font().color(&FOREGROUND))
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}

/// Renders the chart and writes it to `path`.
pub fn write_svg(
    calculation: &Calculation,
    config: &ChartConfig,
    path: &Path,
) -> Result<(), ChartError> {
    let svg = render_svg(calculation, config)?;
    std::fs::write(path, svg).map_err(|source| ChartError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "chart written");
    Ok(())
}

/// Upper axis limits, with headroom so the markers are never on the edge.
fn axis_limits(
    curve: &[CurvePoint],
    result: &TaxResult,
) -> (f64, f64) {
    let x_max = curve
        .iter()
        .map(|p| p.income)
        .chain([result.income])
        .max()
        .unwrap_or_default();
    let y_max = curve
        .iter()
        .map(|p| p.tax)
        .chain([result.tax_before_deduction])
        .max()
        .unwrap_or_default();

    (to_f64(x_max).max(1.0), (to_f64(y_max) * 1.05).max(1.0))
}
