//! Tax schedule data loading.

pub mod loader;

pub use loader::{ScheduleLoader, ScheduleLoaderError, ScheduleRecord};
