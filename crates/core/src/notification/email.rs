//! SMTP-backed notifier.

use std::time::Duration;

use async_trait::async_trait;
use leavedesk_shared::{AppConfig, EmailService};

use super::{LeaveNotification, Notifier, NotifyError};

/// Sends notifications through [`EmailService`], bounded by a timeout.
#[derive(Clone)]
pub struct EmailNotifier {
    email: EmailService,
    timeout: Duration,
}

impl EmailNotifier {
    /// Creates a notifier that gives up after `timeout_secs`.
    #[must_use]
    pub fn new(email: EmailService, timeout_secs: u64) -> Self {
        Self {
            email,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Creates a notifier from the email settings and the policy's
    /// dispatch timeout.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            EmailService::new(config.email.clone()),
            config.policy.notification_timeout_secs,
        )
    }

    /// Completes bare usernames with the configured default domain.
    #[must_use]
    pub fn address_for(&self, recipient: &str) -> String {
        if recipient.contains('@') {
            recipient.to_string()
        } else {
            format!("{recipient}@{}", self.email.config().default_domain)
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, notification: &LeaveNotification) -> Result<(), NotifyError> {
        let to = self.address_for(&notification.recipient);
        let subject = notification.subject();
        let body = notification.body();

        match tokio::time::timeout(self.timeout, self.email.send_email(&to, &subject, &body)).await {
            Ok(Ok(())) => {
                tracing::info!(recipient = %to, status = %notification.status, "Leave notification sent");
                Ok(())
            }
            Ok(Err(e)) => Err(NotifyError::Delivery(e.to_string())),
            Err(_) => Err(NotifyError::Timeout(self.timeout.as_secs())),
        }
    }
}
