//! Leave outcome notifications.
//!
//! The engine only calls [`Notifier::notify`]; delivery mechanics live in
//! the implementations. Failures are logged and surfaced as warnings, never
//! propagated.

pub mod email;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::leave::types::{LeaveRequest, LeaveStatus, LeaveType};

pub use email::EmailNotifier;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Audience {
    /// The requesting associate.
    Associate,
    /// The manager who must review the request.
    Manager,
}

/// A leave outcome to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveNotification {
    /// Recipient address.
    pub recipient: String,
    /// Recipient kind.
    pub audience: Audience,
    /// Username of the requester.
    pub associate_name: String,
    /// Final leave type.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Status being announced.
    pub status: LeaveStatus,
    /// Colleague covering the absence.
    pub backup_person: Option<String>,
    /// Why the request is pending, for managers.
    pub reason: Option<String>,
}

impl LeaveNotification {
    /// Builds a notification about `request` for `recipient`.
    #[must_use]
    pub fn for_request(
        request: &LeaveRequest,
        audience: Audience,
        recipient: impl Into<String>,
        associate_name: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            audience,
            associate_name: associate_name.into(),
            leave_type: request.leave_type.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            status: request.status,
            backup_person: request.backup_person.clone(),
            reason: None,
        }
    }

    /// Attaches the pending reason shown to managers.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        match (self.audience, self.status) {
            (Audience::Manager, _) => format!("Action Required: Leave Pending for {}", self.associate_name),
            (Audience::Associate, LeaveStatus::Approved) => {
                format!("Leave Approved: {} to {}", self.start_date, self.end_date)
            }
            (Audience::Associate, LeaveStatus::Pending) => {
                format!("Leave Pending: {} to {}", self.start_date, self.end_date)
            }
            (Audience::Associate, status) => {
                format!("Leave {status}: {} to {}", self.start_date, self.end_date)
            }
        }
    }

    /// Plain-text body.
    #[must_use]
    pub fn body(&self) -> String {
        let backup = self.backup_person.as_deref().unwrap_or("-");
        let details = format!(
            "Leave Type: {}\nStart Date: {}\nEnd Date: {}\nBackup Person: {backup}\n",
            self.leave_type, self.start_date, self.end_date
        );

        match self.audience {
            Audience::Manager => format!(
                "Hi Manager,\n\n{} has submitted a leave request pending your approval.\n\n{details}Reason for Pending: {}\n\nPlease log in to review this leave.\n\nRegards,\nLeave Management System\n",
                self.associate_name,
                self.reason.as_deref().unwrap_or("Pending due to system rules"),
            ),
            Audience::Associate => {
                let closing = if self.status == LeaveStatus::Approved {
                    "Have a great day!"
                } else {
                    "You will receive another update once a manager reviews it."
                };
                format!(
                    "Hi {},\n\nYour leave request is currently {}.\n\n{details}Status: {}\n\n{closing}\n\nRegards,\nLeave Management System\n",
                    self.associate_name, self.status, self.status,
                )
            }
        }
    }
}

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport refused or failed to deliver.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
    /// Delivery did not finish in time.
    #[error("Notification timed out after {0}s")]
    Timeout(u64),
}

/// Delivers leave outcome notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn notify(&self, notification: &LeaveNotification) -> Result<(), NotifyError>;
}

/// Sends `notification`, turning any failure into a warning.
pub async fn dispatch(notifier: &dyn Notifier, notification: &LeaveNotification, warnings: &mut Vec<String>) {
    if let Err(e) = notifier.notify(notification).await {
        tracing::warn!(
            recipient = %notification.recipient,
            status = %notification.status,
            error = %e,
            "Failed to send leave notification"
        );
        warnings.push(format!("Notification to {} failed: {e}", notification.recipient));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use leavedesk_shared::types::{LeaveRequestId, UserId};

    fn request(status: LeaveStatus) -> LeaveRequest {
        let day = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        LeaveRequest {
            id: LeaveRequestId::new(),
            user_id: UserId::new(),
            leave_type: LeaveType::Annual,
            start_date: day,
            end_date: day,
            is_half_day: false,
            status,
            backup_person: Some("sam".into()),
            comments: None,
            consumes_ledger: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_associate_approved_message() {
        let n = LeaveNotification::for_request(&request(LeaveStatus::Approved), Audience::Associate, "a@x.com", "alex");
        assert_eq!(n.subject(), "Leave Approved: 2026-11-02 to 2026-11-02");
        assert!(n.body().contains("Have a great day!"));
        assert!(n.body().contains("Backup Person: sam"));
    }

    #[test]
    fn test_manager_message_carries_reason() {
        let n = LeaveNotification::for_request(&request(LeaveStatus::Pending), Audience::Manager, "m@x.com", "alex")
            .with_reason("Weekly shrinkage 12.00% exceeds 10%");
        assert_eq!(n.subject(), "Action Required: Leave Pending for alex");
        assert!(n.body().contains("Weekly shrinkage 12.00% exceeds 10%"));
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn notify(&self, _notification: &LeaveNotification) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("smtp down".into()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_failure_becomes_warning() {
        let n = LeaveNotification::for_request(&request(LeaveStatus::Pending), Audience::Associate, "a@x.com", "alex");
        let mut warnings = Vec::new();
        dispatch(&Failing, &n, &mut warnings).await;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("smtp down"));
    }
}
