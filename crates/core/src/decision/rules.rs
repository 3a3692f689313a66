//! Category-specific eligibility rules.
//!
//! Pure functions: every input is loaded by the engine beforehand, so the
//! rules can be exercised without any store.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use leavedesk_shared::LeavePolicy;

use crate::calendar::{dates_between, months_between, weeks_between, working_days_between};
use crate::decision::types::DecisionReason;
use crate::leave::types::{LeaveStatus, LeaveType, day_count, span_days};
use crate::shrinkage::math::TeamSnapshot;

/// Result of running the rules against an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Approved, Pending or Rejected.
    pub status: LeaveStatus,
    /// Whether an approval deducts balance and monthly quota.
    pub consumes_ledger: bool,
    /// Reasons behind the outcome.
    pub reasons: Vec<DecisionReason>,
}

impl Assessment {
    fn approve(consumes_ledger: bool, reason: DecisionReason) -> Self {
        Self {
            status: LeaveStatus::Approved,
            consumes_ledger,
            reasons: vec![reason],
        }
    }

    fn pending(reasons: Vec<DecisionReason>) -> Self {
        Self {
            status: LeaveStatus::Pending,
            consumes_ledger: false,
            reasons,
        }
    }

    fn reject(reason: DecisionReason) -> Self {
        Self {
            status: LeaveStatus::Rejected,
            consumes_ledger: false,
            reasons: vec![reason],
        }
    }
}

/// Everything the rules read.
#[derive(Debug, Clone, Copy)]
pub struct RuleInputs<'a> {
    /// Leave type after normalization.
    pub leave_type: &'a LeaveType,
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Half-day flag.
    pub is_half_day: bool,
    /// Auto-approvals already counted this month.
    pub monthly_count: u32,
    /// Balance of `leave_type`.
    pub balance: Decimal,
    /// Approved leave of the team around the requested span.
    pub snapshot: &'a TeamSnapshot,
    /// Daily total shrinkage limit of the team.
    pub team_total_limit: Decimal,
    /// Thresholds.
    pub policy: &'a LeavePolicy,
}

impl RuleInputs<'_> {
    fn day_count(&self) -> Decimal {
        day_count(self.start, self.end, self.is_half_day)
    }

    /// Days the daily gates inspect: the single day for a half day, else
    /// the working days of the span.
    fn gated_days(&self) -> Vec<NaiveDate> {
        if self.is_half_day {
            vec![self.start]
        } else {
            working_days_between(self.start, self.end).collect()
        }
    }
}

/// Converts CL spanning more than the CL maximum into AL.
#[must_use]
pub fn normalize_type(
    requested: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
    policy: &LeavePolicy,
) -> (LeaveType, Option<DecisionReason>) {
    let days = span_days(start, end);
    if requested == LeaveType::Casual && days > policy.casual_leave_max_days {
        (LeaveType::Annual, Some(DecisionReason::ConvertedToAnnual { days }))
    } else {
        (requested, None)
    }
}

/// Monthly quota and balance checks shared by every consuming category.
#[must_use]
pub fn generic_checks(inputs: &RuleInputs<'_>) -> Vec<DecisionReason> {
    let mut failures = Vec::new();
    if inputs.monthly_count >= inputs.policy.monthly_auto_approval_cap {
        failures.push(DecisionReason::MonthlyCapReached {
            used: inputs.monthly_count,
            cap: inputs.policy.monthly_auto_approval_cap,
        });
    }
    let requested = inputs.day_count();
    if inputs.balance < requested {
        failures.push(DecisionReason::InsufficientBalance {
            leave_type: inputs.leave_type.clone(),
            available: inputs.balance,
            requested,
        });
    }
    failures
}

/// Runs the rules for the application's category.
#[must_use]
pub fn evaluate(inputs: &RuleInputs<'_>) -> Assessment {
    match inputs.leave_type {
        LeaveType::Optional => evaluate_optional(inputs),
        LeaveType::Annual | LeaveType::Casual => evaluate_planned(inputs),
        LeaveType::Sick => evaluate_sick(inputs),
        LeaveType::Other(_) => Assessment::pending(vec![DecisionReason::ManualReview {
            leave_type: inputs.leave_type.clone(),
        }]),
    }
}

fn evaluate_optional(inputs: &RuleInputs<'_>) -> Assessment {
    if dates_between(inputs.start, inputs.end).all(|d| inputs.snapshot.is_optional_day(d)) {
        return Assessment::approve(false, DecisionReason::AllOptionalDays);
    }

    let days = span_days(inputs.start, inputs.end);
    if days > inputs.policy.optional_leave_max_days {
        return Assessment::reject(DecisionReason::OptionalSpanTooLong {
            days,
            max: inputs.policy.optional_leave_max_days,
        });
    }

    let failures = generic_checks(inputs);
    if failures.is_empty() {
        Assessment::approve(true, DecisionReason::WithinLimits)
    } else {
        Assessment::pending(failures)
    }
}

fn evaluate_planned(inputs: &RuleInputs<'_>) -> Assessment {
    let failures = generic_checks(inputs);
    if !failures.is_empty() {
        return Assessment::pending(failures);
    }

    match first_planned_gate_failure(inputs) {
        Some(reason) => Assessment::pending(vec![reason]),
        None => Assessment::approve(true, DecisionReason::WithinLimits),
    }
}

/// Daily, then weekly, then monthly gates; the first failure wins.
fn first_planned_gate_failure(inputs: &RuleInputs<'_>) -> Option<DecisionReason> {
    let policy = inputs.policy;
    let snapshot = inputs.snapshot;

    for date in inputs.gated_days() {
        if snapshot.is_optional_day(date) {
            return Some(DecisionReason::OptionalDayInSpan { date });
        }
        let day = snapshot.daily(date);
        if day.planned_pct >= policy.daily_planned_limit {
            return Some(DecisionReason::DailyPlannedLimit {
                date,
                pct: day.planned_pct,
                limit: policy.daily_planned_limit,
            });
        }
        if day.total_pct >= inputs.team_total_limit {
            return Some(DecisionReason::DailyTotalLimit {
                date,
                pct: day.total_pct,
                limit: inputs.team_total_limit,
            });
        }
    }

    for (week_start, week_end) in weeks_between(inputs.start, inputs.end) {
        let pct = snapshot.range_shrinkage(week_start, week_end);
        if pct > policy.weekly_limit {
            return Some(DecisionReason::WeeklyLimit {
                week_start,
                week_end,
                pct,
                limit: policy.weekly_limit,
            });
        }
    }

    for (year, month) in months_between(inputs.start, inputs.end) {
        let Some((first, last)) = crate::calendar::month_bounds(year, month) else {
            continue;
        };
        let pct = snapshot.range_shrinkage(first, last);
        if pct > policy.monthly_limit {
            return Some(DecisionReason::MonthlyLimit {
                year,
                month,
                pct,
                limit: policy.monthly_limit,
            });
        }
    }

    None
}

fn evaluate_sick(inputs: &RuleInputs<'_>) -> Assessment {
    let failures = generic_checks(inputs);
    if !failures.is_empty() {
        return Assessment::pending(failures);
    }

    for date in inputs.gated_days() {
        let day = inputs.snapshot.daily(date);
        if day.sick_pct >= inputs.policy.sick_limit {
            return Assessment::pending(vec![DecisionReason::SickLimit {
                date,
                pct: day.sick_pct,
                limit: inputs.policy.sick_limit,
            }]);
        }
    }

    Assessment::approve(true, DecisionReason::WithinLimits)
}

/// The window a snapshot must cover for the rules to see every week and
/// month the span touches.
#[must_use]
pub fn evaluation_window(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weeks = weeks_between(start, end);
    let month_start = NaiveDate::from_ymd_opt(start.year(), start.month(), 1).unwrap_or(start);
    let month_end = crate::calendar::month_bounds(end.year(), end.month()).map_or(end, |(_, last)| last);

    let window_start = weeks.first().map_or(month_start, |(monday, _)| (*monday).min(month_start));
    let window_end = weeks.last().map_or(month_end, |(_, sunday)| (*sunday).max(month_end));
    (window_start, window_end)
}
