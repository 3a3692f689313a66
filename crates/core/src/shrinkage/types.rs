//! Shrinkage payloads.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leavedesk_shared::types::{TeamId, UserId};

use crate::leave::types::LeaveType;

/// Share of a team absent on one day, in percent points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyShrinkage {
    /// The day measured.
    pub date: NaiveDate,
    /// Planned (non-sick) absence.
    pub planned_pct: Decimal,
    /// Sick absence.
    pub sick_pct: Decimal,
    /// `planned_pct + sick_pct`, each rounded independently.
    pub total_pct: Decimal,
}

impl DailyShrinkage {
    /// All-zero payload for `date`.
    #[must_use]
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            planned_pct: Decimal::ZERO,
            sick_pct: Decimal::ZERO,
            total_pct: Decimal::ZERO,
        }
    }
}

/// Daily shrinkage for dashboards; never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardShrinkage {
    /// The figures, zeroed when `error` is set.
    #[serde(flatten)]
    pub shrinkage: DailyShrinkage,
    /// True when the figures could not be computed.
    pub error: bool,
    /// Failure description when `error` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Per-week verdict against the monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekStatus {
    /// Cumulative usage still within the monthly target.
    Safe,
    /// Cumulative usage has passed the monthly target.
    Overused,
}

/// Month-level verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthStatus {
    /// Within the monthly target.
    Safe,
    /// Over the monthly target.
    Exceeded,
}

/// One week of the carry-forward report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekShrinkage {
    /// First day of the (clipped) week.
    pub week_start: NaiveDate,
    /// Last day of the (clipped) week.
    pub week_end: NaiveDate,
    /// Shrinkage over the week's working days.
    pub shrinkage: Decimal,
    /// Running sum of `target - shrinkage` up to this week.
    pub carry_forward: Decimal,
    /// Status after this week.
    pub status: WeekStatus,
}

/// Weekly shrinkage of a month with signed carry-forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryForwardReport {
    /// Team measured.
    pub team_id: TeamId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Target per week.
    pub weekly_target: Decimal,
    /// `weekly_target` times the number of weeks.
    pub monthly_target: Decimal,
    /// Sum of weekly shrinkage.
    pub cumulative_used: Decimal,
    /// Weeks in calendar order.
    pub weeks: Vec<WeekShrinkage>,
    /// Overall status.
    pub status: MonthStatus,
}

/// Forecast risk band of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastStatus {
    /// Comfortably staffed.
    Safe,
    /// Close to the limit.
    Tight,
    /// Over the limit.
    Overbooked,
}

/// An associate absent on a forecast day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    /// Absent user.
    pub user_id: UserId,
    /// Their username.
    pub username: String,
    /// Leave type of the approved request.
    pub leave_type: LeaveType,
    /// Half-day absence.
    pub is_half_day: bool,
}

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Shrinkage figures for the day.
    pub shrinkage: DailyShrinkage,
    /// Band derived from `shrinkage.total_pct`.
    pub status: ForecastStatus,
    /// Associates with approved leave that day.
    pub on_leave: Vec<Absence>,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Designated optional holiday.
    pub is_optional_day: bool,
}

/// Aggregates over a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Calendar days covered.
    pub total_days: u32,
    /// Weekdays covered.
    pub working_days: u32,
    /// Mean total shrinkage over working days.
    pub average_working_day_shrinkage: Decimal,
    /// Days classified `Overbooked`.
    pub high_risk_days: u32,
}

/// Rolling forecast of a user's team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// Team forecast.
    pub team_id: TeamId,
    /// Days in calendar order, weekends included.
    pub days: Vec<ForecastDay>,
    /// Aggregates.
    pub summary: ForecastSummary,
}
