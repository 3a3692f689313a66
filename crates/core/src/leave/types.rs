//! Leave domain types.
//!
//! This module defines leave categories, the request status state space,
//! the persisted request and audit log records, and the inputs accepted
//! from the request-handling layer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::{LeaveLogId, LeaveRequestId, UserId};

/// Leave category.
///
/// The fixed categories carry dedicated policies. Anything else is kept
/// verbatim as `Other` and always routed to a manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveType {
    /// Annual leave ("AL").
    Annual,
    /// Casual leave ("CL"), bounded to short spans.
    Casual,
    /// Sick leave.
    Sick,
    /// Optional holiday leave.
    Optional,
    /// Free-form extension category (e.g. "Maternity").
    Other(String),
}

impl LeaveType {
    /// Parses a leave type, case-insensitively for the fixed categories.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "al" => Self::Annual,
            "cl" => Self::Casual,
            "sick" => Self::Sick,
            "optional" => Self::Optional,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Returns the canonical string stored in balances and requests.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Annual => "AL",
            Self::Casual => "CL",
            Self::Sick => "Sick",
            Self::Optional => "Optional",
            Self::Other(name) => name,
        }
    }

    /// Returns true if absences of this type count towards sick shrinkage.
    #[must_use]
    pub fn is_sick(&self) -> bool {
        matches!(self, Self::Sick)
    }
}

impl From<String> for LeaveType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<LeaveType> for String {
    fn from(value: LeaveType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leave request status.
///
/// The valid transitions are:
/// - Pending → Approved (manager approves)
/// - Pending → Rejected (manager rejects)
/// - Pending | Approved → Cancelled (requester cancels)
/// - Pending | Approved → Deleted (requester deletes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveStatus {
    /// Awaiting a manager decision.
    Pending,
    /// Approved, either automatically or by the manager.
    Approved,
    /// Rejected by policy or by the manager.
    Rejected,
    /// Withdrawn by the requester.
    Cancelled,
    /// Soft-deleted by the requester.
    Deleted,
}

impl LeaveStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
            Self::Deleted => "Deleted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns true if a request in this status blocks overlapping applications.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Returns true if the requester may still withdraw the request.
    #[must_use]
    pub fn is_withdrawable(&self) -> bool {
        self.is_active()
    }

    /// Returns true if the request may be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier.
    pub id: LeaveRequestId,
    /// The requesting user.
    pub user_id: UserId,
    /// Final leave type after normalization.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Half-day flag; implies `start_date == end_date`.
    pub is_half_day: bool,
    /// Current status.
    pub status: LeaveStatus,
    /// Name of the colleague covering the absence.
    pub backup_person: Option<String>,
    /// Free-text comments from the requester.
    pub comments: Option<String>,
    /// Whether the current Approved state consumed balance and monthly quota.
    pub consumes_ledger: bool,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the request last changed.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Days consumed by this request, recomputed from its dates.
    #[must_use]
    pub fn day_count(&self) -> Decimal {
        day_count(self.start_date, self.end_date, self.is_half_day)
    }

    /// Team-days this request removes on any single covered date.
    #[must_use]
    pub fn daily_weight(&self) -> Decimal {
        if self.is_half_day {
            Decimal::new(5, 1)
        } else {
            Decimal::ONE
        }
    }

    /// Returns true if the request covers `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if `[start, end]` intersects this request's range.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        ranges_overlap(self.start_date, self.end_date, start, end)
    }
}

/// An immutable audit record for one lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveLog {
    /// Unique identifier.
    pub id: LeaveLogId,
    /// The request this entry belongs to.
    pub leave_request_id: LeaveRequestId,
    /// Username of the actor.
    pub changed_by: String,
    /// Action taken (a status name or "Edited").
    pub action: String,
    /// Free-text comment.
    pub comments: String,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
}

impl LeaveLog {
    /// Creates a log entry stamped with the current time.
    #[must_use]
    pub fn new(
        leave_request_id: LeaveRequestId,
        changed_by: impl Into<String>,
        action: impl Into<String>,
        comments: impl Into<String>,
    ) -> Self {
        Self {
            id: LeaveLogId::new(),
            leave_request_id,
            changed_by: changed_by.into(),
            action: action.into(),
            comments: comments.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A leave application as submitted by an associate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// The applying user.
    pub user_id: UserId,
    /// Requested leave type, as typed by the user.
    pub leave_type: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Half-day flag.
    #[serde(default)]
    pub is_half_day: bool,
    /// Name of the colleague covering the absence.
    #[serde(default)]
    pub backup_person: Option<String>,
    /// Free-text reason.
    #[serde(default)]
    pub comments: Option<String>,
}

/// Changes a requester may make to a pending request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveEdit {
    /// New first day.
    pub start_date: Option<NaiveDate>,
    /// New last day.
    pub end_date: Option<NaiveDate>,
    /// New backup person.
    pub backup_person: Option<String>,
    /// New comments.
    pub comments: Option<String>,
}

/// Actions that can be taken on a leave request.
///
/// Each action carries the information needed to commit the transition
/// and its ledger side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveAction {
    /// Manager approves a pending request.
    Approve {
        /// The new status after approval.
        new_status: LeaveStatus,
        /// The approving manager.
        approved_by: UserId,
        /// When the request was approved.
        approved_at: DateTime<Utc>,
    },
    /// Manager rejects a pending request.
    Reject {
        /// The new status after rejection.
        new_status: LeaveStatus,
        /// The rejecting manager.
        rejected_by: UserId,
        /// Free-text reason.
        reason: Option<String>,
    },
    /// Requester cancels or deletes a request.
    Withdraw {
        /// Cancelled or Deleted.
        new_status: LeaveStatus,
        /// Whether balance and monthly quota must be restored.
        restore_ledger: bool,
    },
}

impl LeaveAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> LeaveStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Withdraw { new_status, .. } => *new_status,
        }
    }
}

/// Inclusive number of calendar days in `[start, end]`.
#[must_use]
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Days consumed by a request: 0.5 for a half day, else the inclusive span.
#[must_use]
pub fn day_count(start: NaiveDate, end: NaiveDate, is_half_day: bool) -> Decimal {
    if is_half_day {
        Decimal::new(5, 1)
    } else {
        Decimal::from(span_days(start, end))
    }
}

/// Inclusive range intersection test.
///
/// Covers left overlap, right overlap, containment in either direction and
/// exact match.
#[must_use]
pub fn ranges_overlap(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start <= b_end && b_start <= a_end
}
