//! Leave service for request state transitions.
//!
//! This module implements the lifecycle state machine. It validates
//! transitions only; committing them is the lifecycle manager's job.

use chrono::Utc;

use leavedesk_shared::types::UserId;

use crate::leave::error::LeaveError;
use crate::leave::types::{LeaveAction, LeaveStatus};

/// Stateless service for managing leave status transitions.
pub struct LeaveService;

impl LeaveService {
    /// Approve a pending request.
    ///
    /// # Returns
    /// * `Ok(LeaveAction::Approve)` if the request is Pending
    /// * `Err(LeaveError::InvalidTransition)` otherwise
    pub fn approve(current_status: LeaveStatus, approved_by: UserId) -> Result<LeaveAction, LeaveError> {
        match current_status {
            LeaveStatus::Pending => Ok(LeaveAction::Approve {
                new_status: LeaveStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(LeaveError::InvalidTransition {
                from: current_status,
                to: LeaveStatus::Approved,
            }),
        }
    }

    /// Reject a pending request.
    ///
    /// # Returns
    /// * `Ok(LeaveAction::Reject)` if the request is Pending
    /// * `Err(LeaveError::InvalidTransition)` otherwise
    pub fn reject(
        current_status: LeaveStatus,
        rejected_by: UserId,
        reason: Option<String>,
    ) -> Result<LeaveAction, LeaveError> {
        match current_status {
            LeaveStatus::Pending => Ok(LeaveAction::Reject {
                new_status: LeaveStatus::Rejected,
                rejected_by,
                reason: reason.filter(|r| !r.trim().is_empty()),
            }),
            _ => Err(LeaveError::InvalidTransition {
                from: current_status,
                to: LeaveStatus::Rejected,
            }),
        }
    }

    /// Cancel or delete a request on behalf of its requester.
    ///
    /// The ledger is restored only when leaving an Approved state that
    /// consumed balance and quota.
    ///
    /// # Returns
    /// * `Ok(LeaveAction::Withdraw)` if the request is Pending or Approved
    ///   and `target` is Cancelled or Deleted
    /// * `Err(LeaveError::InvalidTransition)` otherwise
    pub fn withdraw(
        current_status: LeaveStatus,
        target: LeaveStatus,
        consumes_ledger: bool,
    ) -> Result<LeaveAction, LeaveError> {
        let valid_target = matches!(target, LeaveStatus::Cancelled | LeaveStatus::Deleted);
        if !valid_target || !current_status.is_withdrawable() {
            return Err(LeaveError::InvalidTransition {
                from: current_status,
                to: target,
            });
        }

        Ok(LeaveAction::Withdraw {
            new_status: target,
            restore_ledger: current_status == LeaveStatus::Approved && consumes_ledger,
        })
    }

    /// Check that a request may still be edited.
    pub fn ensure_editable(current_status: LeaveStatus) -> Result<(), LeaveError> {
        if current_status.is_editable() {
            Ok(())
        } else {
            Err(LeaveError::InvalidTransition {
                from: current_status,
                to: LeaveStatus::Pending,
            })
        }
    }

    /// Check if a transition is valid without executing it.
    #[must_use]
    pub fn can_transition(from: LeaveStatus, to: LeaveStatus) -> bool {
        matches!(
            (from, to),
            (LeaveStatus::Pending, LeaveStatus::Approved | LeaveStatus::Rejected)
                | (
                    LeaveStatus::Pending | LeaveStatus::Approved,
                    LeaveStatus::Cancelled | LeaveStatus::Deleted
                )
        )
    }
}
