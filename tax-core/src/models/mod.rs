mod calculator_bounds;
mod tax_bracket;
mod tax_query;
mod tax_result;
mod tax_schedule;

pub use calculator_bounds::CalculatorBounds;
pub use tax_bracket::TaxBracket;
pub use tax_query::TaxQuery;
pub use tax_result::{SavingsEfficiency, TaxResult};
pub use tax_schedule::{TaxSchedule, TaxScheduleError};
