//! UK Stamp Duty Land Tax calculator

pub mod mortgage;
pub mod tax;

pub use tax::{calculate, calculate_tax, CalculationInput, RateSchedule, TaxError, TaxResult};
