//! Text and JSON rendering of calculation results.

use serde::Serialize;
use tax_core::TaxResult;

use crate::config::OutputFormat;
use crate::utils::{format_amount, format_efficiency, format_percent};

pub const EFFICIENCY_CAPTION: &str =
    "Efficiency = Tax Saved / Deductibles - i.e. how much you saved by increasing your deductibles";

/// A batch result together with the label from its input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelledResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub result: TaxResult,
}

/// Renders the summary shown under the chart.
pub fn text_summary(
    result: &TaxResult,
    decimal_places: u32,
) -> String {
    let amount = |value| format_amount(value, decimal_places);

    format!(
        "Income: {}\n\
         Deductibles: {}\n\
         Old Tax: {}\n\
         New Tax: {}\n\
         Tax Saved: {}\n\
         Tax Savings Efficiency: {}\n\
         Marginal Rate: {}\n",
        amount(result.income),
        amount(result.deduction),
        amount(result.tax_before_deduction),
        amount(result.tax_after_deduction),
        amount(result.tax_saved),
        format_efficiency(&result.savings_efficiency),
        format_percent(result.marginal_rate),
    )
}

/// Full text report: summary plus the efficiency caption.
pub fn text_report(
    result: &TaxResult,
    decimal_places: u32,
) -> String {
    format!("{}\n{EFFICIENCY_CAPTION}\n", text_summary(result, decimal_places))
}

/// Summaries for several results, each headed by its label when it has
/// one and separated by blank lines, with the caption once at the end.
pub fn text_batch_report(
    results: &[LabelledResult],
    decimal_places: u32,
) -> String {
    let summaries: Vec<String> = results
        .iter()
        .map(|row| {
            let summary = text_summary(&row.result, decimal_places);
            match &row.label {
                Some(label) => format!("[{label}]\n{summary}"),
                None => summary,
            }
        })
        .collect();
    format!("{}\n{EFFICIENCY_CAPTION}\n", summaries.join("\n"))
}

/// Pretty-printed JSON for one result.
pub fn json_report(result: &TaxResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Pretty-printed JSON array for a batch of results.
pub fn json_batch_report(results: &[LabelledResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Renders one result in `format`, newline terminated.
pub fn render_single(
    result: &TaxResult,
    format: OutputFormat,
    decimal_places: u32,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(text_report(result, decimal_places)),
        OutputFormat::Json => Ok(json_report(result)? + "\n"),
    }
}

/// Renders a batch in `format`, newline terminated. JSON output is always
/// an array, even for a single row.
pub fn render_batch(
    results: &[LabelledResult],
    format: OutputFormat,
    decimal_places: u32,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(text_batch_report(results, decimal_places)),
        OutputFormat::Json => Ok(json_batch_report(results)? + "\n"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tax_core::{TaxBracket, TaxSchedule, compute_savings};

    use super::*;

    fn schedule() -> TaxSchedule {
        TaxSchedule::new(
            "three tier",
            vec![
                TaxBracket::new(dec!(0), dec!(0)),
                TaxBracket::new(dec!(20000), dec!(0.02)),
                TaxBracket::new(dec!(30000), dec!(0.015)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn text_summary_reference_scenario() {
        let result = compute_savings(&schedule(), dec!(50000), dec!(22300));

        let summary = text_summary(&result, 0);

        assert_eq!(
            summary,
            "Income: 50,000\n\
             Deductibles: 22,300\n\
             Old Tax: 900\n\
             New Tax: 154\n\
             Tax Saved: 746\n\
             Tax Savings Efficiency: 3.35%\n\
             Marginal Rate: 3.50%\n"
        );
    }

    #[test]
    fn text_summary_undefined_efficiency() {
        let result = compute_savings(&schedule(), dec!(50000), Decimal::ZERO);

        let summary = text_summary(&result, 0);

        assert!(summary.contains("Tax Savings Efficiency: undefined\n"));
        assert!(summary.contains("Tax Saved: 0\n"));
    }

    #[test]
    fn text_summary_honours_decimal_places() {
        let result = compute_savings(&schedule(), dec!(20100.50), dec!(0));

        let summary = text_summary(&result, 2);

        assert!(summary.contains("Income: 20,100.50\n"));
        assert!(summary.contains("Old Tax: 2.01\n"));
    }

    #[test]
    fn text_report_ends_with_caption() {
        let result = compute_savings(&schedule(), dec!(50000), dec!(22300));

        let report = text_report(&result, 0);

        assert!(report.ends_with(&format!("{EFFICIENCY_CAPTION}\n")));
    }

    fn labelled(
        label: Option<&str>,
        income: Decimal,
        deduction: Decimal,
    ) -> LabelledResult {
        LabelledResult {
            label: label.map(str::to_string),
            result: compute_savings(&schedule(), income, deduction),
        }
    }

    // =========================================================================
    // batch tests
    // =========================================================================

    #[test]
    fn text_batch_report_separates_rows() {
        let results = vec![
            labelled(Some("cpf top-up"), dec!(50000), dec!(22300)),
            labelled(None, dec!(25000), dec!(0)),
        ];

        let report = text_batch_report(&results, 0);

        assert!(report.starts_with("[cpf top-up]\nIncome: 50,000\n"));
        assert_eq!(report.matches("Income: ").count(), 2);
        assert!(report.contains("Marginal Rate: 3.50%\n\nIncome: 25,000\n"));
        assert_eq!(report.matches(EFFICIENCY_CAPTION).count(), 1);
    }

    #[test]
    fn json_report_contains_all_fields() {
        let result = compute_savings(&schedule(), dec!(50000), dec!(22300));

        let json: serde_json::Value =
            serde_json::from_str(&json_report(&result).unwrap()).unwrap();

        assert_eq!(json["income"], "50000");
        assert_eq!(json["adjusted_income"], "27700");
        assert!(json["tax_saved"].as_str().unwrap().starts_with("746"));
        assert!(json["savings_efficiency"]["ratio"].is_string());
    }

    #[test]
    fn json_batch_report_is_array() {
        let results = vec![
            labelled(Some("cpf"), dec!(50000), dec!(22300)),
            labelled(None, dec!(50000), dec!(0)),
        ];

        let json: serde_json::Value =
            serde_json::from_str(&json_batch_report(&results).unwrap()).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["label"], "cpf");
        assert_eq!(json[0]["adjusted_income"], "27700");
        assert!(json[1].get("label").is_none());
        assert_eq!(json[1]["savings_efficiency"], "undefined");
    }

    // =========================================================================
    // render tests
    // =========================================================================

    #[test]
    fn render_single_text_and_json() {
        let result = compute_savings(&schedule(), dec!(50000), dec!(22300));

        let text = render_single(&result, OutputFormat::Text, 0).unwrap();
        let json = render_single(&result, OutputFormat::Json, 0).unwrap();

        assert_eq!(text, text_report(&result, 0));
        assert!(json.starts_with('{'));
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn render_batch_json_is_array_for_single_row() {
        let results = vec![labelled(Some("only"), dec!(50000), dec!(22300))];

        let output = render_batch(&results, OutputFormat::Json, 0).unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert!(output.ends_with("]\n"));
    }

    #[test]
    fn render_batch_text_ends_with_caption() {
        let results = vec![labelled(None, dec!(50000), dec!(22300))];

        let output = render_batch(&results, OutputFormat::Text, 0).unwrap();

        assert_eq!(output, text_batch_report(&results, 0));
    }
}
