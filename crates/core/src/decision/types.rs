//! Decision verdicts and the reasons behind them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::LeaveRequestId;

use crate::leave::types::{LeaveStatus, LeaveType};

/// Outcome reported to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictStatus {
    /// Auto-approved.
    Approved,
    /// Routed to the manager.
    Pending,
    /// Refused outright.
    Rejected,
    /// Not recorded (duplicate application).
    Error,
}

impl From<LeaveStatus> for VerdictStatus {
    fn from(status: LeaveStatus) -> Self {
        match status {
            LeaveStatus::Approved => Self::Approved,
            LeaveStatus::Pending => Self::Pending,
            LeaveStatus::Rejected => Self::Rejected,
            LeaveStatus::Cancelled | LeaveStatus::Deleted => Self::Error,
        }
    }
}

/// Why a verdict came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DecisionReason {
    /// The range intersects an active request of the same user.
    Duplicate {
        /// The colliding request.
        existing: LeaveRequestId,
    },
    /// Casual leave too long for CL was converted to annual leave.
    ConvertedToAnnual {
        /// Requested span in days.
        days: i64,
    },
    /// The FCFS auto-approval quota for the month is used up.
    MonthlyCapReached {
        /// Approvals already counted.
        used: u32,
        /// Monthly cap.
        cap: u32,
    },
    /// Not enough balance of the final leave type.
    InsufficientBalance {
        /// Leave type charged.
        leave_type: LeaveType,
        /// Remaining days.
        available: Decimal,
        /// Days requested.
        requested: Decimal,
    },
    /// Every requested day is an optional holiday.
    AllOptionalDays,
    /// Optional leave over ordinary days spans too long.
    OptionalSpanTooLong {
        /// Requested span in days.
        days: i64,
        /// Longest permitted span.
        max: i64,
    },
    /// A requested working day is an optional holiday.
    OptionalDayInSpan {
        /// The holiday.
        date: NaiveDate,
    },
    /// Planned shrinkage gate failed.
    DailyPlannedLimit {
        /// Day checked.
        date: NaiveDate,
        /// Observed planned shrinkage.
        pct: Decimal,
        /// Exclusive limit.
        limit: Decimal,
    },
    /// Total shrinkage gate failed.
    DailyTotalLimit {
        /// Day checked.
        date: NaiveDate,
        /// Observed total shrinkage.
        pct: Decimal,
        /// Exclusive limit.
        limit: Decimal,
    },
    /// Weekly shrinkage gate failed.
    WeeklyLimit {
        /// Monday of the week.
        week_start: NaiveDate,
        /// Sunday of the week.
        week_end: NaiveDate,
        /// Observed weekly shrinkage.
        pct: Decimal,
        /// Inclusive limit.
        limit: Decimal,
    },
    /// Monthly shrinkage gate failed.
    MonthlyLimit {
        /// Calendar year.
        year: i32,
        /// Calendar month.
        month: u32,
        /// Observed monthly shrinkage.
        pct: Decimal,
        /// Inclusive limit.
        limit: Decimal,
    },
    /// Sick shrinkage gate failed.
    SickLimit {
        /// Day checked.
        date: NaiveDate,
        /// Observed sick shrinkage.
        pct: Decimal,
        /// Exclusive limit.
        limit: Decimal,
    },
    /// The leave type has no automatic policy.
    ManualReview {
        /// The leave type.
        leave_type: LeaveType,
    },
    /// The balance changed between the check and the deduction.
    BalanceChanged,
    /// Every gate passed.
    WithinLimits,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { existing } => write!(f, "Overlaps existing leave request {existing}"),
            Self::ConvertedToAnnual { days } => write!(f, "CL spanning {days} days converted to AL"),
            Self::MonthlyCapReached { used, cap } => {
                write!(f, "Monthly auto-approval limit reached ({used}/{cap})")
            }
            Self::InsufficientBalance {
                leave_type,
                available,
                requested,
            } => write!(
                f,
                "Insufficient {leave_type} balance: {available} available, {requested} requested"
            ),
            Self::AllOptionalDays => f.write_str("All requested days are optional holidays"),
            Self::OptionalSpanTooLong { days, max } => {
                write!(f, "Optional leave of {days} days exceeds the {max}-day maximum")
            }
            Self::OptionalDayInSpan { date } => write!(f, "{date} is an optional holiday"),
            Self::DailyPlannedLimit { date, pct, limit } => {
                write!(f, "Planned shrinkage on {date} is {pct}% (limit {limit}%)")
            }
            Self::DailyTotalLimit { date, pct, limit } => {
                write!(f, "Total shrinkage on {date} is {pct}% (limit {limit}%)")
            }
            Self::WeeklyLimit {
                week_start,
                week_end,
                pct,
                limit,
            } => write!(
                f,
                "Weekly shrinkage {week_start} to {week_end} is {pct}% (limit {limit}%)"
            ),
            Self::MonthlyLimit {
                year,
                month,
                pct,
                limit,
            } => write!(f, "Monthly shrinkage for {year}-{month:02} is {pct}% (limit {limit}%)"),
            Self::SickLimit { date, pct, limit } => {
                write!(f, "Sick shrinkage on {date} is {pct}% (limit {limit}%)")
            }
            Self::ManualReview { leave_type } => write!(f, "{leave_type} leave requires manager review"),
            Self::BalanceChanged => f.write_str("Balance changed before it could be deducted"),
            Self::WithinLimits => f.write_str("Within all shrinkage and quota limits"),
        }
    }
}

/// The engine's answer to a leave application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome.
    pub status: VerdictStatus,
    /// Recorded request, absent for `Error`.
    pub leave_id: Option<LeaveRequestId>,
    /// Human-readable summary.
    pub message: String,
    /// Final leave type after normalization.
    pub leave_type: LeaveType,
    /// Leave type as requested.
    pub original_leave_type: LeaveType,
    /// Reasons behind the outcome.
    pub reasons: Vec<DecisionReason>,
    /// Non-fatal problems, e.g. failed notifications.
    pub warnings: Vec<String>,
}

impl Verdict {
    /// Returns true if any reason matches `predicate`.
    pub fn has_reason(&self, predicate: impl Fn(&DecisionReason) -> bool) -> bool {
        self.reasons.iter().any(predicate)
    }
}

/// Summary line for a verdict status.
#[must_use]
pub fn verdict_message(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Approved => "Leave approved",
        VerdictStatus::Pending => "Leave pending manager approval",
        VerdictStatus::Rejected => "Leave rejected",
        VerdictStatus::Error => "Leave overlaps an existing request",
    }
}
