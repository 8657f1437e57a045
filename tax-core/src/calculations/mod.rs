//! Tax calculation modules.
//!
//! The engine evaluates a tiered marginal schedule; `common` holds the
//! rounding and clamping helpers it shares with the presentation layer.

pub mod common;
pub mod engine;

pub use engine::{CurvePoint, EngineError, TaxEngine, compute_savings, compute_tax};
