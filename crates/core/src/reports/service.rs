//! Report generation service.

use chrono::{Datelike, NaiveDate};

use leavedesk_shared::LeavePolicy;
use leavedesk_shared::types::UserId;

use crate::directory::User;
use crate::leave::error::LeaveError;
use crate::leave::types::{LeaveStatus, LeaveType};
use crate::ledger::quota::remaining_quota;
use crate::store::Stores;

use super::types::{BalanceSummary, LeaveHistoryEntry, OnLeaveEntry, PendingApproval, TypeBalance};

/// Leave types listed in balance summaries.
pub const SUMMARY_TYPES: [LeaveType; 4] = [LeaveType::Annual, LeaveType::Casual, LeaveType::Sick, LeaveType::Optional];

/// Read-only reports over the stores.
#[derive(Clone)]
pub struct ReportService {
    stores: Stores,
    policy: LeavePolicy,
}

impl ReportService {
    /// Creates a report service.
    #[must_use]
    pub fn new(stores: Stores, policy: LeavePolicy) -> Self {
        Self { stores, policy }
    }

    /// Pending requests of a manager's direct reports, soonest first.
    pub async fn pending_approvals(
        &self,
        manager_id: UserId,
        today: NaiveDate,
    ) -> Result<Vec<PendingApproval>, LeaveError> {
        let reports = self.stores.directory.direct_reports(manager_id).await?;
        let ids: Vec<UserId> = reports.iter().map(|u| u.id).collect();
        let pending = self
            .stores
            .leaves
            .list_for_users_with_status(&ids, LeaveStatus::Pending)
            .await?;

        Ok(pending
            .into_iter()
            .map(|request| {
                let days_until_start = (request.start_date - today).num_days();
                PendingApproval {
                    requester: username_of(&reports, request.user_id),
                    urgent: days_until_start <= self.policy.urgent_within_days,
                    days_until_start,
                    request,
                }
            })
            .collect())
    }

    /// Per-type balances plus this month's quota usage.
    pub async fn balance_summary(&self, user_id: UserId) -> Result<BalanceSummary, LeaveError> {
        let mut balances = Vec::with_capacity(SUMMARY_TYPES.len());
        for leave_type in SUMMARY_TYPES {
            let balance = self.stores.ledger.get_balance(user_id, &leave_type).await?;
            balances.push(TypeBalance { leave_type, balance });
        }
        let monthly_used = self.stores.ledger.get_monthly_count(user_id).await?;
        let monthly_cap = self.policy.monthly_auto_approval_cap;

        Ok(BalanceSummary {
            user_id,
            balances,
            monthly_used,
            monthly_cap,
            monthly_remaining: remaining_quota(monthly_cap, monthly_used),
        })
    }

    /// A user's requests starting in `year`, newest first, with audit logs.
    pub async fn leave_history(&self, user_id: UserId, year: i32) -> Result<Vec<LeaveHistoryEntry>, LeaveError> {
        let requests = self.stores.leaves.list_for_user(user_id).await?;
        let mut history = Vec::new();
        for request in requests.into_iter().filter(|r| r.start_date.year() == year) {
            let logs = self.stores.leaves.logs_for(request.id).await?;
            history.push(LeaveHistoryEntry { request, logs });
        }
        Ok(history)
    }

    /// Direct reports of a manager on approved leave on `date`.
    pub async fn on_leave_today(&self, manager_id: UserId, date: NaiveDate) -> Result<Vec<OnLeaveEntry>, LeaveError> {
        let reports = self.stores.directory.direct_reports(manager_id).await?;
        let ids: Vec<UserId> = reports.iter().map(|u| u.id).collect();
        let active = self.stores.leaves.approved_in_range(&ids, date, date).await?;

        Ok(active
            .into_iter()
            .map(|r| OnLeaveEntry {
                leave_id: r.id,
                user_id: r.user_id,
                username: username_of(&reports, r.user_id),
                leave_type: r.leave_type,
                start_date: r.start_date,
                end_date: r.end_date,
                is_half_day: r.is_half_day,
                backup_person: r.backup_person,
            })
            .collect())
    }
}

fn username_of(users: &[User], id: UserId) -> String {
    users
        .iter()
        .find(|u| u.id == id)
        .map_or_else(|| id.to_string(), |u| u.username.clone())
}
