//! Pure shrinkage arithmetic over a loaded team snapshot.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calendar::{dates_between, is_working_day};
use crate::directory::User;
use crate::leave::types::LeaveRequest;
use crate::shrinkage::types::{
    Absence, DailyShrinkage, ForecastDay, ForecastStatus, ForecastSummary,
};

/// `numerator / denominator * 100`, rounded to 2 dp; zero for an empty team.
#[must_use]
pub fn percent(numerator: Decimal, denominator: usize) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    (numerator / Decimal::from(denominator) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Forecast band for a day's total shrinkage.
#[must_use]
pub fn classify(total_pct: Decimal, safe_below: Decimal, tight_at_most: Decimal) -> ForecastStatus {
    if total_pct < safe_below {
        ForecastStatus::Safe
    } else if total_pct <= tight_at_most {
        ForecastStatus::Tight
    } else {
        ForecastStatus::Overbooked
    }
}

/// Everything shrinkage needs about one team over one window.
#[derive(Debug, Clone, Default)]
pub struct TeamSnapshot {
    /// Active associates of the team.
    pub associates: Vec<User>,
    /// Approved requests of those associates intersecting the window.
    pub leaves: Vec<LeaveRequest>,
    /// Optional holidays within the window.
    pub optional_days: BTreeSet<NaiveDate>,
}

impl TeamSnapshot {
    /// Shrinkage denominator.
    #[must_use]
    pub fn headcount(&self) -> usize {
        self.associates.len()
    }

    /// Returns true if `date` is an optional holiday.
    #[must_use]
    pub fn is_optional_day(&self, date: NaiveDate) -> bool {
        self.optional_days.contains(&date)
    }

    /// Approved requests covering `date`.
    pub fn absent_on(&self, date: NaiveDate) -> impl Iterator<Item = &LeaveRequest> {
        self.leaves.iter().filter(move |l| l.covers(date))
    }

    /// Team-days absent on `date`, split `(planned, sick)`.
    #[must_use]
    pub fn leave_days_on(&self, date: NaiveDate) -> (Decimal, Decimal) {
        self.absent_on(date).fold((Decimal::ZERO, Decimal::ZERO), |(planned, sick), l| {
            if l.leave_type.is_sick() {
                (planned, sick + l.daily_weight())
            } else {
                (planned + l.daily_weight(), sick)
            }
        })
    }

    /// Daily shrinkage; optional holidays and empty teams are all zero.
    #[must_use]
    pub fn daily(&self, date: NaiveDate) -> DailyShrinkage {
        if self.is_optional_day(date) || self.headcount() == 0 {
            return DailyShrinkage::zero(date);
        }

        let (planned, sick) = self.leave_days_on(date);
        let planned_pct = percent(planned, self.headcount());
        let sick_pct = percent(sick, self.headcount());
        DailyShrinkage {
            date,
            planned_pct,
            sick_pct,
            total_pct: planned_pct + sick_pct,
        }
    }

    /// Leave-days over the working days of `[start, end]` divided by
    /// `associates * working days`, in percent.
    ///
    /// Optional holidays count as working days but contribute no leave.
    #[must_use]
    pub fn range_shrinkage(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        let mut working_days = 0usize;
        let mut leave_days = Decimal::ZERO;
        for date in dates_between(start, end).filter(|d| is_working_day(*d)) {
            working_days += 1;
            if self.is_optional_day(date) {
                continue;
            }
            let (planned, sick) = self.leave_days_on(date);
            leave_days += planned + sick;
        }
        percent(leave_days, self.headcount() * working_days)
    }

    /// Person-days of leave inside `[start, end]` per associate, in percent.
    ///
    /// Every calendar day of overlap counts, weekends and optional holidays
    /// included; a half-day request counts 0.5.
    #[must_use]
    pub fn person_day_shrinkage(&self, start: NaiveDate, end: NaiveDate) -> Decimal {
        let leave_days: Decimal = self
            .leaves
            .iter()
            .filter(|l| l.overlaps(start, end))
            .map(|l| {
                if l.is_half_day {
                    Decimal::new(5, 1)
                } else {
                    let days = (l.end_date.min(end) - l.start_date.max(start)).num_days() + 1;
                    Decimal::from(days)
                }
            })
            .sum();
        percent(leave_days, self.headcount())
    }

    /// Associates absent on `date` with their leave details.
    #[must_use]
    pub fn absences_on(&self, date: NaiveDate) -> Vec<Absence> {
        self.absent_on(date)
            .map(|l| Absence {
                user_id: l.user_id,
                username: self
                    .associates
                    .iter()
                    .find(|u| u.id == l.user_id)
                    .map_or_else(|| l.user_id.to_string(), |u| u.username.clone()),
                leave_type: l.leave_type.clone(),
                is_half_day: l.is_half_day,
            })
            .collect()
    }

    /// Forecast entry for one day.
    #[must_use]
    pub fn forecast_day(&self, date: NaiveDate, safe_below: Decimal, tight_at_most: Decimal) -> ForecastDay {
        let shrinkage = self.daily(date);
        ForecastDay {
            status: classify(shrinkage.total_pct, safe_below, tight_at_most),
            on_leave: self.absences_on(date),
            is_weekend: !is_working_day(date),
            is_optional_day: self.is_optional_day(date),
            shrinkage,
        }
    }
}

/// Aggregates a list of forecast days.
#[must_use]
pub fn summarize(days: &[ForecastDay]) -> ForecastSummary {
    let working: Vec<&ForecastDay> = days.iter().filter(|d| !d.is_weekend).collect();
    let total: Decimal = working.iter().map(|d| d.shrinkage.total_pct).sum();
    let average = if working.is_empty() {
        Decimal::ZERO
    } else {
        (total / Decimal::from(working.len())).round_dp(2)
    };

    ForecastSummary {
        total_days: u32::try_from(days.len()).unwrap_or(u32::MAX),
        working_days: u32::try_from(working.len()).unwrap_or(u32::MAX),
        average_working_day_shrinkage: average,
        high_risk_days: u32::try_from(
            days.iter()
                .filter(|d| d.status == ForecastStatus::Overbooked)
                .count(),
        )
        .unwrap_or(u32::MAX),
    }
}
