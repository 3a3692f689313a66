//! Commits verdicts and drives manager and requester transitions.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use leavedesk_shared::types::{LeaveRequestId, UserId};

use crate::decision::rules::Assessment;
use crate::decision::types::{DecisionReason, Verdict, VerdictStatus, verdict_message};
use crate::directory::{User, resolve_manager};
use crate::leave::error::LeaveError;
use crate::leave::service::LeaveService;
use crate::leave::types::{
    LeaveAction, LeaveApplication, LeaveEdit, LeaveLog, LeaveRequest, LeaveStatus, LeaveType, day_count,
};
use crate::notification::{Audience, LeaveNotification, Notifier, dispatch};
use crate::store::Stores;

/// Audit actor for engine decisions.
pub const SYSTEM_ACTOR: &str = "system";

/// A rules outcome ready to be committed.
#[derive(Debug, Clone)]
pub struct Decision {
    /// The applicant.
    pub user: User,
    /// The application as submitted.
    pub application: LeaveApplication,
    /// Leave type as requested.
    pub original_leave_type: LeaveType,
    /// Leave type after normalization.
    pub leave_type: LeaveType,
    /// CL to AL conversion, if any.
    pub conversion: Option<DecisionReason>,
    /// Rules outcome.
    pub assessment: Assessment,
}

/// Applies verdicts and lifecycle transitions to the stores.
#[derive(Clone)]
pub struct LifecycleManager {
    stores: Stores,
    notifier: Arc<dyn Notifier>,
}

impl LifecycleManager {
    /// Creates a lifecycle manager.
    #[must_use]
    pub fn new(stores: Stores, notifier: Arc<dyn Notifier>) -> Self {
        Self { stores, notifier }
    }

    /// Persists a decided application, consumes the ledger for approvals,
    /// writes the audit entry and notifies.
    pub async fn commit(&self, decision: Decision) -> Result<Verdict, LeaveError> {
        let Decision {
            user,
            application,
            original_leave_type,
            leave_type,
            conversion,
            assessment,
        } = decision;

        let mut status = assessment.status;
        let mut consumes_ledger = assessment.consumes_ledger;
        let mut reasons: Vec<DecisionReason> = conversion.into_iter().collect();
        reasons.extend(assessment.reasons);

        if status == LeaveStatus::Approved && consumes_ledger {
            let days = day_count(application.start_date, application.end_date, application.is_half_day);
            if self.stores.ledger.decrement_balance(user.id, &leave_type, days).await? {
                self.stores.ledger.increment_monthly_count(user.id).await?;
            } else {
                warn!(user_id = %user.id, %leave_type, %days, "Balance changed before deduction; routing to manager");
                status = LeaveStatus::Pending;
                consumes_ledger = false;
                reasons.retain(|r| *r != DecisionReason::WithinLimits);
                reasons.push(DecisionReason::BalanceChanged);
            }
        }

        let now = Utc::now();
        let request = LeaveRequest {
            id: LeaveRequestId::new(),
            user_id: user.id,
            leave_type: leave_type.clone(),
            start_date: application.start_date,
            end_date: application.end_date,
            is_half_day: application.is_half_day,
            status,
            backup_person: application.backup_person.clone(),
            comments: application.comments.clone(),
            consumes_ledger,
            created_at: now,
            updated_at: now,
        };
        self.stores.leaves.insert(&request).await?;

        let summary = reasons.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        let log_comment = if original_leave_type == leave_type {
            summary.clone()
        } else {
            format!("Requested {original_leave_type}, recorded as {leave_type}. {summary}")
        };
        self.stores
            .leaves
            .append_log(&LeaveLog::new(request.id, SYSTEM_ACTOR, status.as_str(), log_comment))
            .await?;

        info!(
            leave_id = %request.id,
            user_id = %user.id,
            %leave_type,
            status = %status,
            consumes_ledger,
            "Leave decision committed"
        );

        let mut warnings = Vec::new();
        if status != LeaveStatus::Rejected {
            let notification =
                LeaveNotification::for_request(&request, Audience::Associate, &user.email, &user.username);
            dispatch(self.notifier.as_ref(), &notification, &mut warnings).await;
        }
        if status == LeaveStatus::Pending {
            self.notify_manager(&user, &request, &summary, &mut warnings).await?;
        }

        let verdict_status = VerdictStatus::from(status);
        Ok(Verdict {
            status: verdict_status,
            leave_id: Some(request.id),
            message: verdict_message(verdict_status).to_string(),
            leave_type,
            original_leave_type,
            reasons,
            warnings,
        })
    }

    async fn notify_manager(
        &self,
        user: &User,
        request: &LeaveRequest,
        reason: &str,
        warnings: &mut Vec<String>,
    ) -> Result<(), LeaveError> {
        match resolve_manager(self.stores.directory.as_ref(), user).await? {
            Some(manager) => {
                let notification =
                    LeaveNotification::for_request(request, Audience::Manager, &manager.email, &user.username)
                        .with_reason(reason);
                dispatch(self.notifier.as_ref(), &notification, warnings).await;
            }
            None => {
                warn!(user_id = %user.id, "No manager to notify about pending leave");
                warnings.push(format!("No manager found for {}", user.username));
            }
        }
        Ok(())
    }

    /// Manager approves a pending request, consuming the ledger when the
    /// balance covers it.
    ///
    /// Returns the updated request and any notification warnings.
    pub async fn approve(
        &self,
        leave_id: LeaveRequestId,
        manager_id: UserId,
        comment: Option<String>,
    ) -> Result<(LeaveRequest, Vec<String>), LeaveError> {
        let (request, requester, manager) = self.load_for_review(leave_id, manager_id).await?;
        let action = LeaveService::approve(request.status, manager.id)?;

        let days = request.day_count();
        let consumes_ledger = self
            .stores
            .ledger
            .decrement_balance(request.user_id, &request.leave_type, days)
            .await?;

        if !self
            .stores
            .leaves
            .update_status(leave_id, request.status, action.new_status(), consumes_ledger)
            .await?
        {
            if consumes_ledger {
                self.stores
                    .ledger
                    .increment_balance(request.user_id, &request.leave_type, days)
                    .await?;
            }
            return Err(self.stale_transition(leave_id, action.new_status()).await);
        }
        if consumes_ledger {
            self.stores.ledger.increment_monthly_count(request.user_id).await?;
        }

        let mut log_comment = comment.unwrap_or_else(|| "Approved by manager".to_string());
        if !consumes_ledger {
            log_comment.push_str(&format!(" (no {} balance deducted: insufficient balance)", request.leave_type));
        }
        self.stores
            .leaves
            .append_log(&LeaveLog::new(leave_id, &manager.username, action.new_status().as_str(), log_comment))
            .await?;

        info!(%leave_id, manager = %manager.username, consumes_ledger, "Leave approved by manager");

        let updated = self.reload(leave_id).await?;
        let mut warnings = Vec::new();
        let notification =
            LeaveNotification::for_request(&updated, Audience::Associate, &requester.email, &requester.username);
        dispatch(self.notifier.as_ref(), &notification, &mut warnings).await;

        Ok((updated, warnings))
    }

    /// Manager rejects a pending request. The associate is not notified.
    pub async fn reject(
        &self,
        leave_id: LeaveRequestId,
        manager_id: UserId,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let (request, _requester, manager) = self.load_for_review(leave_id, manager_id).await?;
        let action = LeaveService::reject(request.status, manager.id, reason)?;

        if !self
            .stores
            .leaves
            .update_status(leave_id, request.status, action.new_status(), false)
            .await?
        {
            return Err(self.stale_transition(leave_id, action.new_status()).await);
        }

        let comment = match action {
            LeaveAction::Reject { reason: Some(reason), .. } => reason,
            _ => "Rejected by manager".to_string(),
        };
        self.stores
            .leaves
            .append_log(&LeaveLog::new(leave_id, &manager.username, LeaveStatus::Rejected.as_str(), comment))
            .await?;

        info!(%leave_id, manager = %manager.username, "Leave rejected by manager");
        self.reload(leave_id).await
    }

    /// Requester withdraws a Pending or Approved request.
    pub async fn cancel(&self, leave_id: LeaveRequestId, requester_id: UserId) -> Result<LeaveRequest, LeaveError> {
        self.withdraw(leave_id, requester_id, LeaveStatus::Cancelled, "Leave cancelled by user")
            .await
    }

    /// Requester soft-deletes a Pending or Approved request.
    pub async fn delete(&self, leave_id: LeaveRequestId, requester_id: UserId) -> Result<LeaveRequest, LeaveError> {
        self.withdraw(leave_id, requester_id, LeaveStatus::Deleted, "Leave marked as deleted by user")
            .await
    }

    async fn withdraw(
        &self,
        leave_id: LeaveRequestId,
        requester_id: UserId,
        target: LeaveStatus,
        comment: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self.reload(leave_id).await?;
        if request.user_id != requester_id {
            return Err(LeaveError::NotRequester(requester_id));
        }
        let requester = self.find_user(requester_id).await?;
        let action = LeaveService::withdraw(request.status, target, request.consumes_ledger)?;

        if !self
            .stores
            .leaves
            .update_status(leave_id, request.status, action.new_status(), false)
            .await?
        {
            return Err(self.stale_transition(leave_id, target).await);
        }

        if let LeaveAction::Withdraw { restore_ledger: true, .. } = action {
            let days = request.day_count();
            self.stores
                .ledger
                .increment_balance(request.user_id, &request.leave_type, days)
                .await?;
            self.stores.ledger.decrement_monthly_count(request.user_id).await?;
            info!(%leave_id, leave_type = %request.leave_type, %days, "Ledger restored");
        }

        self.stores
            .leaves
            .append_log(&LeaveLog::new(leave_id, &requester.username, target.as_str(), comment))
            .await?;

        info!(%leave_id, from = %request.status, to = %target, "Leave withdrawn by requester");
        self.reload(leave_id).await
    }

    /// Requester changes the dates, backup person or comments of a pending request.
    pub async fn edit(
        &self,
        leave_id: LeaveRequestId,
        requester_id: UserId,
        edit: LeaveEdit,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self.reload(leave_id).await?;
        if request.user_id != requester_id {
            return Err(LeaveError::NotRequester(requester_id));
        }
        LeaveService::ensure_editable(request.status)?;
        let requester = self.find_user(requester_id).await?;

        let start = edit.start_date.unwrap_or(request.start_date);
        let end = edit.end_date.unwrap_or(request.end_date);
        let dates_changed = start != request.start_date || end != request.end_date;
        if dates_changed {
            validate_dates(start, end, request.is_half_day, Utc::now().date_naive())?;
            let overlapping = self
                .stores
                .leaves
                .find_overlapping(requester_id, start, end, &[LeaveStatus::Pending, LeaveStatus::Approved])
                .await?;
            if let Some(other) = overlapping.iter().find(|r| r.id != leave_id) {
                return Err(LeaveError::Overlapping(other.id));
            }
        }

        let mut changes = Vec::new();
        if dates_changed {
            changes.push(format!(
                "dates {} to {} -> {start} to {end}",
                request.start_date, request.end_date
            ));
        }
        if edit.backup_person.is_some() && edit.backup_person != request.backup_person {
            changes.push("backup person".to_string());
        }
        if edit.comments.is_some() && edit.comments != request.comments {
            changes.push("comments".to_string());
        }

        let updated = LeaveRequest {
            start_date: start,
            end_date: end,
            backup_person: edit.backup_person.or_else(|| request.backup_person.clone()),
            comments: edit.comments.or_else(|| request.comments.clone()),
            updated_at: Utc::now(),
            ..request.clone()
        };
        if !self.stores.leaves.update_details(&updated).await? {
            return Err(self.stale_transition(leave_id, LeaveStatus::Pending).await);
        }

        let comment = if changes.is_empty() {
            "No changes".to_string()
        } else {
            format!("Updated {}", changes.join(", "))
        };
        self.stores
            .leaves
            .append_log(&LeaveLog::new(leave_id, &requester.username, "Edited", comment))
            .await?;

        info!(%leave_id, "Pending leave edited");
        self.reload(leave_id).await
    }

    async fn load_for_review(
        &self,
        leave_id: LeaveRequestId,
        manager_id: UserId,
    ) -> Result<(LeaveRequest, User, User), LeaveError> {
        let request = self.reload(leave_id).await?;
        let requester = self.find_user(request.user_id).await?;
        if requester.reports_to != Some(manager_id) {
            return Err(LeaveError::NotDirectManager(manager_id));
        }
        let manager = self.find_user(manager_id).await?;
        Ok((request, requester, manager))
    }

    async fn reload(&self, leave_id: LeaveRequestId) -> Result<LeaveRequest, LeaveError> {
        self.stores
            .leaves
            .find(leave_id)
            .await?
            .ok_or(LeaveError::LeaveNotFound(leave_id))
    }

    async fn find_user(&self, user_id: UserId) -> Result<User, LeaveError> {
        self.stores
            .directory
            .find_user(user_id)
            .await?
            .ok_or(LeaveError::UserNotFound(user_id))
    }

    /// Builds the conflict error after losing a race on the status.
    async fn stale_transition(&self, leave_id: LeaveRequestId, to: LeaveStatus) -> LeaveError {
        match self.reload(leave_id).await {
            Ok(current) => {
                warn!(%leave_id, current = %current.status, attempted = %to, "Concurrent status change");
                LeaveError::InvalidTransition {
                    from: current.status,
                    to,
                }
            }
            Err(e) => e,
        }
    }
}

/// Date checks shared by new applications and edits.
pub fn validate_dates(start: NaiveDate, end: NaiveDate, is_half_day: bool, today: NaiveDate) -> Result<(), LeaveError> {
    if start > end {
        return Err(LeaveError::StartAfterEnd { start, end });
    }
    if start < today {
        return Err(LeaveError::StartInPast(start));
    }
    if is_half_day && start != end {
        return Err(LeaveError::HalfDaySpan);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_validate_dates() {
        let today = d(2026, 10, 18);
        assert!(validate_dates(d(2026, 10, 18), d(2026, 10, 18), true, today).is_ok());
        assert!(matches!(
            validate_dates(d(2026, 10, 20), d(2026, 10, 19), false, today),
            Err(LeaveError::StartAfterEnd { .. })
        ));
        assert!(matches!(
            validate_dates(d(2026, 10, 17), d(2026, 10, 19), false, today),
            Err(LeaveError::StartInPast(_))
        ));
        assert!(matches!(
            validate_dates(d(2026, 10, 19), d(2026, 10, 20), true, today),
            Err(LeaveError::HalfDaySpan)
        ));
    }
}
