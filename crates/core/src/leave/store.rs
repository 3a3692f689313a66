//! Leave request and audit log storage seam.

use async_trait::async_trait;
use chrono::NaiveDate;

use leavedesk_shared::types::{LeaveRequestId, UserId};

use crate::leave::error::LeaveError;
use crate::leave::types::{LeaveLog, LeaveRequest, LeaveStatus};

/// Durable store for leave requests and their audit trail.
///
/// Requests are never physically removed. Status changes go through
/// [`LeaveStore::update_status`], a compare-and-set on the current status,
/// so that two concurrent transitions cannot both succeed.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Persists a new request.
    async fn insert(&self, request: &LeaveRequest) -> Result<(), LeaveError>;

    /// Loads a request by id.
    async fn find(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError>;

    /// Moves a request from `expected` to `new`, recording `consumes_ledger`.
    ///
    /// Returns false without mutating anything when the stored status is
    /// no longer `expected`.
    async fn update_status(
        &self,
        id: LeaveRequestId,
        expected: LeaveStatus,
        new: LeaveStatus,
        consumes_ledger: bool,
    ) -> Result<bool, LeaveError>;

    /// Overwrites dates, backup person and comments of a Pending request.
    ///
    /// Returns false when the stored request is no longer Pending.
    async fn update_details(&self, request: &LeaveRequest) -> Result<bool, LeaveError>;

    /// Requests of `user_id` in one of `statuses` whose range intersects `[start, end]`.
    async fn find_overlapping(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[LeaveStatus],
    ) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Approved requests of any of `user_ids` intersecting `[start, end]`.
    async fn approved_in_range(
        &self,
        user_ids: &[UserId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Every request of a user, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Requests of any of `user_ids` currently in `status`, ordered by start date.
    async fn list_for_users_with_status(
        &self,
        user_ids: &[UserId],
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>, LeaveError>;

    /// Appends an audit log entry.
    async fn append_log(&self, log: &LeaveLog) -> Result<(), LeaveError>;

    /// Audit log of a request, oldest first.
    async fn logs_for(&self, id: LeaveRequestId) -> Result<Vec<LeaveLog>, LeaveError>;
}
