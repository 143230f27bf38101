pub mod error;
pub mod price;
pub mod schedule;
pub mod sdlt;

pub use error::TaxError;
pub use price::{parse_price, price_from_f64};
pub use schedule::{BandTable, RateSchedule, ScheduleError, TableKind, TaxBand};
pub use sdlt::{calculate, calculate_tax, BandContribution, CalculationInput, TaxResult};
