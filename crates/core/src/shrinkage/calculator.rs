//! Shrinkage calculator over the durable stores.

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use leavedesk_shared::LeavePolicy;
use leavedesk_shared::types::{TeamId, UserId};

use crate::calendar::{month_bounds, weeks_of_month};
use crate::directory::User;
use crate::leave::error::LeaveError;
use crate::shrinkage::math::{TeamSnapshot, summarize};
use crate::shrinkage::types::{
    CarryForwardReport, DailyShrinkage, DashboardShrinkage, Forecast, MonthStatus, WeekShrinkage,
    WeekStatus,
};
use crate::store::Stores;

/// Computes team availability metrics from approved leave.
///
/// Every call re-reads the stores.
#[derive(Clone)]
pub struct ShrinkageCalculator {
    stores: Stores,
    policy: LeavePolicy,
}

impl ShrinkageCalculator {
    /// Creates a calculator.
    #[must_use]
    pub fn new(stores: Stores, policy: LeavePolicy) -> Self {
        Self { stores, policy }
    }

    /// Loads associates, their approved leave and optional days for `[start, end]`.
    pub async fn snapshot(
        &self,
        team_id: TeamId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TeamSnapshot, LeaveError> {
        let associates: Vec<User> = self
            .stores
            .directory
            .team_members(team_id)
            .await?
            .into_iter()
            .filter(User::is_counted_associate)
            .collect();

        if associates.is_empty() {
            warn!(%team_id, "Team has no active associates; shrinkage is zero");
            return Ok(TeamSnapshot::default());
        }

        let ids: Vec<UserId> = associates.iter().map(|u| u.id).collect();
        let leaves = self.stores.leaves.approved_in_range(&ids, start, end).await?;
        let optional_days = self.stores.calendar.optional_days_between(start, end).await?;

        debug!(
            %team_id,
            associates = associates.len(),
            leaves = leaves.len(),
            %start,
            %end,
            "Loaded team snapshot"
        );

        Ok(TeamSnapshot {
            associates,
            leaves,
            optional_days,
        })
    }

    /// Share of the team absent on `date`.
    pub async fn team_shrinkage(&self, team_id: TeamId, date: NaiveDate) -> Result<DailyShrinkage, LeaveError> {
        if self.stores.calendar.is_optional_day(date).await? {
            return Ok(DailyShrinkage::zero(date));
        }
        let snapshot = self.snapshot(team_id, date, date).await?;
        Ok(snapshot.daily(date))
    }

    /// Weighted shrinkage over the working days of `[week_start, week_end]`.
    pub async fn weekly_shrinkage(
        &self,
        team_id: TeamId,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Decimal, LeaveError> {
        let snapshot = self.snapshot(team_id, week_start, week_end).await?;
        Ok(snapshot.range_shrinkage(week_start, week_end))
    }

    /// Weighted shrinkage over the working days of a calendar month.
    pub async fn monthly_shrinkage(&self, team_id: TeamId, year: i32, month: u32) -> Result<Decimal, LeaveError> {
        let (first, last) = month_bounds(year, month).ok_or(LeaveError::InvalidPeriod { year, month })?;
        let snapshot = self.snapshot(team_id, first, last).await?;
        Ok(snapshot.range_shrinkage(first, last))
    }

    /// Weekly shrinkage of a month against the weekly target, with the signed
    /// surplus or deficit carried from week to week.
    pub async fn weekly_carry_forward(
        &self,
        team_id: TeamId,
        year: i32,
        month: u32,
    ) -> Result<CarryForwardReport, LeaveError> {
        let (first, last) = month_bounds(year, month).ok_or(LeaveError::InvalidPeriod { year, month })?;
        let snapshot = self.snapshot(team_id, first, last).await?;
        Ok(carry_forward(&snapshot, team_id, year, month, self.policy.weekly_target))
    }

    /// Rolling forecast for the team of `user_id`, starting today.
    pub async fn forecast(&self, user_id: UserId) -> Result<Forecast, LeaveError> {
        let user = self
            .stores
            .directory
            .find_user(user_id)
            .await?
            .ok_or(LeaveError::UserNotFound(user_id))?;
        let team_id = user.team_id.ok_or(LeaveError::NoTeam(user_id))?;

        let today = Utc::now().date_naive();
        let horizon = u64::from(self.policy.forecast_days.max(1) - 1);
        let end = today
            .checked_add_days(Days::new(horizon))
            .ok_or_else(|| LeaveError::Processing("forecast horizon out of range".to_string()))?;

        let snapshot = self.snapshot(team_id, today, end).await?;
        let days: Vec<_> = crate::calendar::dates_between(today, end)
            .map(|date| {
                snapshot.forecast_day(
                    date,
                    self.policy.forecast_safe_below,
                    self.policy.forecast_tight_at_most,
                )
            })
            .collect();
        let summary = summarize(&days);

        Ok(Forecast { team_id, days, summary })
    }

    /// Daily shrinkage for dashboards; failures become a zeroed, flagged payload.
    pub async fn dashboard_shrinkage(&self, team_id: TeamId, date: NaiveDate) -> DashboardShrinkage {
        match self.team_shrinkage(team_id, date).await {
            Ok(shrinkage) => DashboardShrinkage {
                shrinkage,
                error: false,
                message: None,
            },
            Err(e) => {
                error!(%team_id, %date, error = %e, "Shrinkage computation failed");
                DashboardShrinkage {
                    shrinkage: DailyShrinkage::zero(date),
                    error: true,
                    message: Some(e.to_string()),
                }
            }
        }
    }
}

/// Builds the carry-forward report from a snapshot covering the month.
///
/// Each week is measured in person-days per associate over the clipped week,
/// not in working-day-weighted shrinkage.
#[must_use]
pub fn carry_forward(
    snapshot: &TeamSnapshot,
    team_id: TeamId,
    year: i32,
    month: u32,
    weekly_target: Decimal,
) -> CarryForwardReport {
    let weeks = weeks_of_month(year, month);
    let monthly_target = weekly_target * Decimal::from(weeks.len());

    let mut cumulative_used = Decimal::ZERO;
    let mut carry = Decimal::ZERO;
    let mut results = Vec::with_capacity(weeks.len());

    for (week_start, week_end) in weeks {
        let shrinkage = snapshot.person_day_shrinkage(week_start, week_end);
        carry += weekly_target - shrinkage;
        cumulative_used += shrinkage;
        results.push(WeekShrinkage {
            week_start,
            week_end,
            shrinkage,
            carry_forward: carry.round_dp(2),
            status: if cumulative_used <= monthly_target {
                WeekStatus::Safe
            } else {
                WeekStatus::Overused
            },
        });
    }

    CarryForwardReport {
        team_id,
        year,
        month,
        weekly_target,
        monthly_target,
        cumulative_used: cumulative_used.round_dp(2),
        weeks: results,
        status: if cumulative_used <= monthly_target {
            MonthStatus::Safe
        } else {
            MonthStatus::Exceeded
        },
    }
}
