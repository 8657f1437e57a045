pub mod calculations;
pub mod models;
pub mod schedules;

pub use calculations::{CurvePoint, EngineError, TaxEngine, compute_savings, compute_tax};
pub use models::*;
