//! Team shrinkage: the share of a team unavailable on a day, week or month.
//!
//! # Modules
//!
//! - `types` - Daily, weekly, carry-forward and forecast payloads
//! - `math` - Pure arithmetic over a loaded team snapshot
//! - `calculator` - Store-backed entry points

pub mod calculator;
pub mod math;
pub mod types;

#[cfg(test)]
mod math_props;

pub use calculator::{ShrinkageCalculator, carry_forward};
pub use math::{TeamSnapshot, classify, percent, summarize};
pub use types::{
    Absence, CarryForwardReport, DailyShrinkage, DashboardShrinkage, Forecast, ForecastDay,
    ForecastStatus, ForecastSummary, MonthStatus, WeekShrinkage, WeekStatus,
};
