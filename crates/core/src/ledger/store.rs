//! Balance and monthly counter storage seam.

use async_trait::async_trait;
use rust_decimal::Decimal;

use leavedesk_shared::types::UserId;

use crate::leave::error::LeaveError;
use crate::leave::types::LeaveType;

/// Durable store for leave balances and monthly auto-approval counters.
///
/// Monthly counters are keyed by the current "YYYY-MM" (see
/// [`crate::ledger::current_month_key`]), so a new month starts from zero
/// without any reset job. Every mutation commits immediately.
#[async_trait]
pub trait LeaveLedger: Send + Sync {
    /// Remaining days of `leave_type`; zero when no record exists.
    async fn get_balance(&self, user_id: UserId, leave_type: &LeaveType) -> Result<Decimal, LeaveError>;

    /// Atomically subtracts `days` if the balance covers them.
    ///
    /// Returns false and leaves the balance untouched otherwise.
    async fn decrement_balance(
        &self,
        user_id: UserId,
        leave_type: &LeaveType,
        days: Decimal,
    ) -> Result<bool, LeaveError>;

    /// Adds `days` back. No-op when no record exists.
    async fn increment_balance(
        &self,
        user_id: UserId,
        leave_type: &LeaveType,
        days: Decimal,
    ) -> Result<(), LeaveError>;

    /// Auto-approvals counted for the user this month.
    async fn get_monthly_count(&self, user_id: UserId) -> Result<u32, LeaveError>;

    /// Counts one more approval this month, creating the record on first use.
    async fn increment_monthly_count(&self, user_id: UserId) -> Result<(), LeaveError>;

    /// Releases one approval this month, flooring at zero.
    async fn decrement_monthly_count(&self, user_id: UserId) -> Result<(), LeaveError>;
}
