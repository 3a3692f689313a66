//! Optional holiday calendar and working-day helpers.

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;

use crate::leave::error::LeaveError;

/// Dates designated as zero-shrinkage optional holidays.
#[async_trait]
pub trait OptionalCalendar: Send + Sync {
    /// Returns true if `date` is an optional holiday.
    async fn is_optional_day(&self, date: NaiveDate) -> Result<bool, LeaveError>;

    /// Optional holidays within `[start, end]`.
    async fn optional_days_between(&self, start: NaiveDate, end: NaiveDate)
    -> Result<BTreeSet<NaiveDate>, LeaveError>;
}

/// Returns true for Monday through Friday.
#[must_use]
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every date in `[start, end]`, inclusive.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Working days in `[start, end]`.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    dates_between(start, end).filter(|d| is_working_day(*d))
}

/// First and last day of a calendar month.
#[must_use]
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(chrono::Months::new(1))?;
    Some((first, next.pred_opt()?))
}

/// Monday-anchored weeks of a month, clipped to the month's bounds.
#[must_use]
pub fn weeks_of_month(year: i32, month: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut current = first;
    while current <= last {
        let to_sunday = u64::from(6 - current.weekday().num_days_from_monday());
        let week_end = current
            .checked_add_days(Days::new(to_sunday))
            .map_or(last, |d| d.min(last));
        weeks.push((current, week_end));
        match week_end.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    weeks
}

/// Calendar months `(year, month)` touched by `[start, end]`.
#[must_use]
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    while (year, month) <= (end.year(), end.month()) {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Monday-to-Sunday weeks overlapping `[start, end]`.
#[must_use]
pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut weeks = Vec::new();
    let offset = u64::from(start.weekday().num_days_from_monday());
    let Some(mut monday) = start.checked_sub_days(Days::new(offset)) else {
        return weeks;
    };
    while monday <= end {
        let Some(sunday) = monday.checked_add_days(Days::new(6)) else {
            break;
        };
        weeks.push((monday, sunday));
        match sunday.succ_opt() {
            Some(next) => monday = next,
            None => break,
        }
    }
    weeks
}
