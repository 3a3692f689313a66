//! Monthly quota helpers.

use chrono::{Datelike, NaiveDate, Utc};

/// Formats the "YYYY-MM" key a monthly counter is stored under.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Key of the current UTC month.
#[must_use]
pub fn current_month_key() -> String {
    month_key(Utc::now().date_naive())
}

/// Auto-approvals still available this month, never negative.
#[must_use]
pub fn remaining_quota(cap: u32, used: u32) -> u32 {
    cap.saturating_sub(used)
}
