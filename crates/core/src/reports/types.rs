//! Report payloads for managers and associates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leavedesk_shared::types::{LeaveRequestId, UserId};

use crate::leave::types::{LeaveLog, LeaveRequest, LeaveType};

/// A pending request awaiting a manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingApproval {
    /// The request.
    pub request: LeaveRequest,
    /// Requester's username.
    pub requester: String,
    /// Days from today until the leave starts.
    pub days_until_start: i64,
    /// Starts within the urgency window.
    pub urgent: bool,
}

/// Remaining days of one leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBalance {
    /// Leave type.
    pub leave_type: LeaveType,
    /// Remaining days.
    pub balance: Decimal,
}

/// Balances and FCFS quota of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// The user.
    pub user_id: UserId,
    /// Per-type balances.
    pub balances: Vec<TypeBalance>,
    /// Auto-approvals counted this month.
    pub monthly_used: u32,
    /// Monthly cap.
    pub monthly_cap: u32,
    /// Auto-approvals still available this month.
    pub monthly_remaining: u32,
}

/// A request with its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveHistoryEntry {
    /// The request.
    pub request: LeaveRequest,
    /// Audit log, oldest first.
    pub logs: Vec<LeaveLog>,
}

/// A direct report on approved leave on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnLeaveEntry {
    /// The request.
    pub leave_id: LeaveRequestId,
    /// The absent user.
    pub user_id: UserId,
    /// Their username.
    pub username: String,
    /// Leave type.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Half-day absence.
    pub is_half_day: bool,
    /// Colleague covering.
    pub backup_person: Option<String>,
}
