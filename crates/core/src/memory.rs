//! In-memory implementation of every store seam.
//!
//! Backed by `DashMap`; a balance decrement holds the entry's shard lock
//! for the check and the write, so concurrent decrements on the same
//! (user, leave type) key serialise.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use leavedesk_shared::types::{LeaveRequestId, TeamId, UserId};

use crate::calendar::OptionalCalendar;
use crate::directory::{Directory, Team, User};
use crate::leave::error::LeaveError;
use crate::leave::store::LeaveStore;
use crate::leave::types::{LeaveLog, LeaveRequest, LeaveStatus, LeaveType};
use crate::ledger::quota::current_month_key;
use crate::ledger::store::LeaveLedger;
use crate::notification::{LeaveNotification, Notifier, NotifyError};

/// Process-local store for tests, demos and single-node tooling.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: DashMap<UserId, User>,
    teams: DashMap<TeamId, Team>,
    requests: DashMap<LeaveRequestId, LeaveRequest>,
    logs: DashMap<LeaveRequestId, Vec<LeaveLog>>,
    balances: DashMap<(UserId, String), Decimal>,
    monthly_counts: DashMap<(UserId, String), u32>,
    optional_days: DashMap<NaiveDate, String>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub fn add_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Adds or replaces a team.
    pub fn add_team(&self, team: Team) {
        self.teams.insert(team.id, team);
    }

    /// Sets the remaining days of a leave type.
    pub fn set_balance(&self, user_id: UserId, leave_type: &LeaveType, days: Decimal) {
        self.balances.insert((user_id, leave_type.as_str().to_string()), days);
    }

    /// Sets this month's auto-approval count.
    pub fn set_monthly_count(&self, user_id: UserId, count: u32) {
        self.monthly_counts.insert((user_id, current_month_key()), count);
    }

    /// Designates `date` as an optional holiday.
    pub fn add_optional_day(&self, date: NaiveDate, name: impl Into<String>) {
        self.optional_days.insert(date, name.into());
    }

    /// Number of stored requests, any status.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

#[async_trait]
impl Directory for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, LeaveError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>, LeaveError> {
        Ok(self.teams.get(&id).map(|t| t.value().clone()))
    }

    async fn team_members(&self, team_id: TeamId) -> Result<Vec<User>, LeaveError> {
        let mut members: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.team_id == Some(team_id))
            .map(|u| u.value().clone())
            .collect();
        members.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(members)
    }

    async fn direct_reports(&self, manager_id: UserId) -> Result<Vec<User>, LeaveError> {
        let mut reports: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.reports_to == Some(manager_id))
            .map(|u| u.value().clone())
            .collect();
        reports.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(reports)
    }
}

#[async_trait]
impl LeaveStore for InMemoryStore {
    async fn insert(&self, request: &LeaveRequest) -> Result<(), LeaveError> {
        self.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError> {
        Ok(self.requests.get(&id).map(|r| r.value().clone()))
    }

    async fn update_status(
        &self,
        id: LeaveRequestId,
        expected: LeaveStatus,
        new: LeaveStatus,
        consumes_ledger: bool,
    ) -> Result<bool, LeaveError> {
        let Some(mut request) = self.requests.get_mut(&id) else {
            return Ok(false);
        };
        if request.status != expected {
            return Ok(false);
        }
        request.status = new;
        request.consumes_ledger = consumes_ledger;
        request.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_details(&self, updated: &LeaveRequest) -> Result<bool, LeaveError> {
        let Some(mut request) = self.requests.get_mut(&updated.id) else {
            return Ok(false);
        };
        if request.status != LeaveStatus::Pending {
            return Ok(false);
        }
        request.start_date = updated.start_date;
        request.end_date = updated.end_date;
        request.backup_person.clone_from(&updated.backup_person);
        request.comments.clone_from(&updated.comments);
        request.updated_at = Utc::now();
        Ok(true)
    }

    async fn find_overlapping(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[LeaveStatus],
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        Ok(self
            .requests
            .iter()
            .filter(|r| r.user_id == user_id && statuses.contains(&r.status) && r.overlaps(start, end))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn approved_in_range(
        &self,
        user_ids: &[UserId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        let mut found: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|r| {
                r.status == LeaveStatus::Approved && user_ids.contains(&r.user_id) && r.overlaps(start, end)
            })
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|r| (r.start_date, r.id));
        Ok(found)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LeaveRequest>, LeaveError> {
        let mut found: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn list_for_users_with_status(
        &self,
        user_ids: &[UserId],
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        let mut found: Vec<LeaveRequest> = self
            .requests
            .iter()
            .filter(|r| r.status == status && user_ids.contains(&r.user_id))
            .map(|r| r.value().clone())
            .collect();
        found.sort_by_key(|r| (r.start_date, r.id));
        Ok(found)
    }

    async fn append_log(&self, log: &LeaveLog) -> Result<(), LeaveError> {
        self.logs.entry(log.leave_request_id).or_default().push(log.clone());
        Ok(())
    }

    async fn logs_for(&self, id: LeaveRequestId) -> Result<Vec<LeaveLog>, LeaveError> {
        Ok(self.logs.get(&id).map(|l| l.value().clone()).unwrap_or_default())
    }
}

#[async_trait]
impl LeaveLedger for InMemoryStore {
    async fn get_balance(&self, user_id: UserId, leave_type: &LeaveType) -> Result<Decimal, LeaveError> {
        Ok(self
            .balances
            .get(&(user_id, leave_type.as_str().to_string()))
            .map_or(Decimal::ZERO, |b| *b.value()))
    }

    async fn decrement_balance(
        &self,
        user_id: UserId,
        leave_type: &LeaveType,
        days: Decimal,
    ) -> Result<bool, LeaveError> {
        match self.balances.get_mut(&(user_id, leave_type.as_str().to_string())) {
            Some(mut balance) if *balance >= days => {
                *balance -= days;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_balance(
        &self,
        user_id: UserId,
        leave_type: &LeaveType,
        days: Decimal,
    ) -> Result<(), LeaveError> {
        if let Some(mut balance) = self.balances.get_mut(&(user_id, leave_type.as_str().to_string())) {
            *balance += days;
        }
        Ok(())
    }

    async fn get_monthly_count(&self, user_id: UserId) -> Result<u32, LeaveError> {
        Ok(self
            .monthly_counts
            .get(&(user_id, current_month_key()))
            .map_or(0, |c| *c.value()))
    }

    async fn increment_monthly_count(&self, user_id: UserId) -> Result<(), LeaveError> {
        *self.monthly_counts.entry((user_id, current_month_key())).or_insert(0) += 1;
        Ok(())
    }

    async fn decrement_monthly_count(&self, user_id: UserId) -> Result<(), LeaveError> {
        if let Some(mut count) = self.monthly_counts.get_mut(&(user_id, current_month_key())) {
            *count = count.saturating_sub(1);
        }
        Ok(())
    }
}

#[async_trait]
impl OptionalCalendar for InMemoryStore {
    async fn is_optional_day(&self, date: NaiveDate) -> Result<bool, LeaveError> {
        Ok(self.optional_days.contains_key(&date))
    }

    async fn optional_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, LeaveError> {
        Ok(self
            .optional_days
            .iter()
            .map(|d| *d.key())
            .filter(|d| *d >= start && *d <= end)
            .collect())
    }
}

/// Notifier that keeps every delivered notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<LeaveNotification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far, in order.
    pub async fn sent(&self) -> Vec<LeaveNotification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &LeaveNotification) -> Result<(), NotifyError> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}
