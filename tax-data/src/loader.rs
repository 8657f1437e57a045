use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{TaxBracket, TaxSchedule, TaxScheduleError};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a tax schedule.
#[derive(Debug, Error)]
pub enum ScheduleLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("cannot read schedule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: one of `rate` or `marginal_rate` is required")]
    MissingRate { row: usize },

    #[error("row {row}: `rate` and `marginal_rate` are mutually exclusive")]
    ConflictingRates { row: usize },

    #[error("row {row}: rate is out of range")]
    RateOverflow { row: usize },

    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] TaxScheduleError),
}

impl From<csv::Error> for ScheduleLoaderError {
    fn from(err: csv::Error) -> Self {
        ScheduleLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a schedule CSV file.
///
/// - `threshold`: income at which the bracket starts
/// - `rate`: incremental rate over the previous bracket (e.g. 0.015)
/// - `marginal_rate`: total marginal rate for the bracket (e.g. 0.035)
///
/// Each row carries exactly one of `rate` or `marginal_rate`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScheduleRecord {
    pub threshold: Decimal,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub marginal_rate: Option<Decimal>,
}

/// Loader for tax schedules stored as CSV.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_data::ScheduleLoader;
///
/// let csv = "threshold,marginal_rate\n0,0\n20000,0.02\n30000,0.035\n";
/// let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();
/// let schedule = ScheduleLoader::build("custom", &records).unwrap();
///
/// assert_eq!(schedule.brackets()[2].rate, dec!(0.015));
/// ```
pub struct ScheduleLoader;

impl ScheduleLoader {
    /// Parse schedule records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScheduleRecord>, ScheduleLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScheduleRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Convert records into a validated schedule.
    ///
    /// Rows are taken in file order. `marginal_rate` rows are converted to
    /// increments by subtracting the previous row's marginal rate, so both
    /// column styles may be mixed in one file.
    pub fn build(
        name: &str,
        records: &[ScheduleRecord],
    ) -> Result<TaxSchedule, ScheduleLoaderError> {
        let mut brackets = Vec::with_capacity(records.len());
        let mut marginal = Decimal::ZERO;

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let increment = match (record.rate, record.marginal_rate) {
                (Some(rate), None) => Some(rate),
                (None, Some(total)) => total.checked_sub(marginal),
                (None, None) => return Err(ScheduleLoaderError::MissingRate { row }),
                (Some(_), Some(_)) => return Err(ScheduleLoaderError::ConflictingRates { row }),
            }
            .ok_or(ScheduleLoaderError::RateOverflow { row })?;
            marginal = marginal
                .checked_add(increment)
                .ok_or(ScheduleLoaderError::RateOverflow { row })?;
            brackets.push(TaxBracket::new(record.threshold, increment));
        }

        let schedule = TaxSchedule::new(name, brackets)?;
        debug!(
            name,
            brackets = schedule.brackets().len(),
            top_rate = %schedule.top_marginal_rate(),
            "built tax schedule"
        );
        Ok(schedule)
    }

    /// Read and build a schedule from a CSV file. The schedule is named
    /// after the file stem.
    pub fn load_file(path: &Path) -> Result<TaxSchedule, ScheduleLoaderError> {
        let file = File::open(path)?;
        let records = Self::parse(file)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self::build(&name, &records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const INCREMENT_CSV: &str = r#"threshold,rate
0,0
20000,0.02
30000,0.015
"#;

    const MARGINAL_CSV: &str = r#"threshold,marginal_rate
0,0
20000,0.02
30000,0.035
"#;

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn parse_increment_records() {
        let records = ScheduleLoader::parse(INCREMENT_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            ScheduleRecord {
                threshold: dec!(20000),
                rate: Some(dec!(0.02)),
                marginal_rate: None,
            }
        );
    }

    #[test]
    fn parse_trims_whitespace() {
        let csv = "threshold , rate\n 0 , 0 \n 20000 , 0.02 \n";

        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        assert_eq!(records[1].threshold, dec!(20000));
        assert_eq!(records[1].rate, Some(dec!(0.02)));
    }

    #[test]
    fn parse_invalid_number_is_csv_error() {
        let csv = "threshold,rate\nabc,0\n";

        let result = ScheduleLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(ScheduleLoaderError::CsvParse(_))));
    }

    // =========================================================================
    // build tests
    // =========================================================================

    #[test]
    fn build_from_increments() {
        let records = ScheduleLoader::parse(INCREMENT_CSV.as_bytes()).unwrap();

        let schedule = ScheduleLoader::build("test", &records).unwrap();

        assert_eq!(schedule.name(), "test");
        assert_eq!(schedule.top_marginal_rate(), dec!(0.035));
    }

    #[test]
    fn build_marginal_and_increment_styles_agree() {
        let increments = ScheduleLoader::parse(INCREMENT_CSV.as_bytes()).unwrap();
        let marginals = ScheduleLoader::parse(MARGINAL_CSV.as_bytes()).unwrap();

        let a = ScheduleLoader::build("test", &increments).unwrap();
        let b = ScheduleLoader::build("test", &marginals).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn build_mixed_columns() {
        let csv = "threshold,rate,marginal_rate\n0,0,\n20000,,0.02\n30000,0.015,\n";
        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        let schedule = ScheduleLoader::build("mixed", &records).unwrap();

        assert_eq!(schedule.brackets()[1].rate, dec!(0.02));
        assert_eq!(schedule.brackets()[2].rate, dec!(0.015));
    }

    #[test]
    fn build_rejects_row_without_rate() {
        let csv = "threshold,rate,marginal_rate\n0,0,\n20000,,\n";
        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        let result = ScheduleLoader::build("test", &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::MissingRate { row: 2 })
        ));
    }

    #[test]
    fn build_rejects_row_with_both_rates() {
        let csv = "threshold,rate,marginal_rate\n0,0,0\n";
        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        let result = ScheduleLoader::build("test", &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::ConflictingRates { row: 1 })
        ));
    }

    #[test]
    fn build_rejects_decreasing_marginal_rate() {
        let csv = "threshold,marginal_rate\n0,0\n20000,0.05\n30000,0.03\n";
        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        let result = ScheduleLoader::build("test", &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::InvalidSchedule(
                TaxScheduleError::NegativeRate { .. }
            ))
        ));
    }

    #[test]
    fn build_rejects_rates_that_overflow() {
        let csv = "threshold,rate\n\
                   0,50000000000000000000000000000.0\n\
                   1,50000000000000000000000000000.0\n";
        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        let result = ScheduleLoader::build("test", &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::RateOverflow { row: 2 })
        ));
    }

    #[test]
    fn build_rejects_marginal_rates_that_overflow() {
        let csv = "threshold,marginal_rate\n\
                   0,-50000000000000000000000000000.0\n\
                   1,50000000000000000000000000000.0\n";
        let records = ScheduleLoader::parse(csv.as_bytes()).unwrap();

        let result = ScheduleLoader::build("test", &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::RateOverflow { row: 2 })
        ));
    }

    #[test]
    fn build_rejects_empty_file() {
        let records = ScheduleLoader::parse("threshold,rate\n".as_bytes()).unwrap();

        let result = ScheduleLoader::build("test", &records);

        assert!(matches!(
            result,
            Err(ScheduleLoaderError::InvalidSchedule(TaxScheduleError::Empty))
        ));
    }
}
