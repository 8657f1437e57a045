//! Calculator configuration.
//!
//! Every section is optional; a missing file or section falls back to the
//! defaults of the public calculator.
//!
//! ```toml
//! log_level = "debug"
//!
//! [bounds]
//! min_income = 1000
//! max_income = 100000000
//!
//! [chart]
//! path = "tax_savings.svg"
//! span = 1.5
//!
//! [output]
//! decimal_places = 0
//! format = "text"
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tax_core::CalculatorBounds;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("chart span must be positive, got {0}")]
    InvalidSpan(Decimal),

    #[error("chart step must be positive, got {0}")]
    InvalidStep(Decimal),

    #[error("chart max_points must be at least 2, got {0}")]
    InvalidMaxPoints(usize),

    #[error("max_income {max_income} times chart span {span} is out of range")]
    ChartRangeOverflow { max_income: Decimal, span: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Upper end of the plotted income range, as a multiple of income.
    pub span: Decimal,
    /// Preferred sampling interval along the income axis.
    pub step: Decimal,
    /// The step is widened so that no more than this many points are drawn.
    pub max_points: usize,
    /// Incomes above this get the "earn too much" headline.
    pub headline_income_threshold: Decimal,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("tax_savings.svg"),
            width: 800,
            height: 640,
            span: Decimal::new(15, 1),
            step: Decimal::from(1_000),
            max_points: 2_000,
            headline_income_threshold: Decimal::from(1_000_000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Decimal places shown for amounts in the text report.
    pub decimal_places: u32,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Log filter applied once the config is read (e.g. "debug").
    pub log_level: Option<String>,
    pub bounds: CalculatorBounds,
    pub chart: ChartConfig,
    pub output: OutputConfig,
}

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub chart_path: Option<PathBuf>,
    pub no_chart: bool,
    pub format: Option<OutputFormat>,
    pub log_level: Option<String>,
}

impl UiConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(
        path: &Path,
        contents: &str,
    ) -> Result<Self, ConfigError> {
        let config: UiConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &contents)
    }

    /// Applies command-line settings on top of the loaded file.
    pub fn apply(
        &mut self,
        overrides: Overrides,
    ) {
        if let Some(path) = overrides.chart_path {
            self.chart.path = path;
        }
        if overrides.no_chart {
            self.chart.enabled = false;
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if overrides.log_level.is_some() {
            self.log_level = overrides.log_level;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chart.span <= Decimal::ZERO {
            return Err(ConfigError::InvalidSpan(self.chart.span));
        }
        if self.chart.step <= Decimal::ZERO {
            return Err(ConfigError::InvalidStep(self.chart.step));
        }
        if self.chart.max_points < 2 {
            return Err(ConfigError::InvalidMaxPoints(self.chart.max_points));
        }
        if self.bounds.max_income.checked_mul(self.chart.span).is_none() {
            return Err(ConfigError::ChartRangeOverflow {
                max_income: self.bounds.max_income,
                span: self.chart.span,
            });
        }
        Ok(())
    }
}
