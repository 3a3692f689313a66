//! Leave decision engine.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use leavedesk_shared::LeavePolicy;

use crate::decision::rules::{RuleInputs, evaluate, evaluation_window, normalize_type};
use crate::decision::types::{DecisionReason, Verdict, VerdictStatus, verdict_message};
use crate::leave::error::LeaveError;
use crate::leave::types::{LeaveApplication, LeaveStatus, LeaveType};
use crate::lifecycle::{Decision, LifecycleManager, validate_dates};
use crate::notification::Notifier;
use crate::shrinkage::calculator::ShrinkageCalculator;
use crate::shrinkage::math::TeamSnapshot;
use crate::store::Stores;

/// Decides leave applications and hands the outcome to the lifecycle manager.
#[derive(Clone)]
pub struct DecisionEngine {
    stores: Stores,
    policy: LeavePolicy,
    shrinkage: ShrinkageCalculator,
    lifecycle: LifecycleManager,
}

impl DecisionEngine {
    /// Creates an engine over `stores`.
    #[must_use]
    pub fn new(stores: Stores, notifier: Arc<dyn Notifier>, policy: LeavePolicy) -> Self {
        Self {
            shrinkage: ShrinkageCalculator::new(stores.clone(), policy.clone()),
            lifecycle: LifecycleManager::new(stores.clone(), notifier),
            stores,
            policy,
        }
    }

    /// Lifecycle manager sharing this engine's stores and notifier.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Shrinkage calculator sharing this engine's stores.
    #[must_use]
    pub fn shrinkage(&self) -> &ShrinkageCalculator {
        &self.shrinkage
    }

    /// Decides an application and commits the result.
    ///
    /// Validation failures return an error and record nothing. An
    /// application overlapping an active request of the same user yields
    /// an `Error` verdict and records nothing.
    pub async fn apply(&self, application: LeaveApplication) -> Result<Verdict, LeaveError> {
        let requested = application.leave_type.trim();
        if requested.is_empty() {
            return Err(LeaveError::MissingField("leave_type"));
        }
        validate_dates(
            application.start_date,
            application.end_date,
            application.is_half_day,
            Utc::now().date_naive(),
        )?;

        let user = self
            .stores
            .directory
            .find_user(application.user_id)
            .await?
            .ok_or(LeaveError::UserNotFound(application.user_id))?;
        let team_id = user.team_id.ok_or(LeaveError::NoTeam(user.id))?;
        let original_leave_type = LeaveType::parse(requested);

        let overlapping = self
            .stores
            .leaves
            .find_overlapping(
                user.id,
                application.start_date,
                application.end_date,
                &[LeaveStatus::Pending, LeaveStatus::Approved],
            )
            .await?;
        if let Some(existing) = overlapping.first() {
            info!(user_id = %user.id, existing = %existing.id, "Duplicate leave application");
            return Ok(Verdict {
                status: VerdictStatus::Error,
                leave_id: None,
                message: verdict_message(VerdictStatus::Error).to_string(),
                leave_type: original_leave_type.clone(),
                original_leave_type,
                reasons: vec![DecisionReason::Duplicate { existing: existing.id }],
                warnings: Vec::new(),
            });
        }

        let (leave_type, conversion) = normalize_type(
            original_leave_type.clone(),
            application.start_date,
            application.end_date,
            &self.policy,
        );

        let team = self
            .stores
            .directory
            .find_team(team_id)
            .await?
            .ok_or(LeaveError::TeamNotFound(team_id))?;
        let monthly_count = self.stores.ledger.get_monthly_count(user.id).await?;
        let balance = self.stores.ledger.get_balance(user.id, &leave_type).await?;

        let snapshot = if matches!(leave_type, LeaveType::Other(_)) {
            TeamSnapshot::default()
        } else {
            let (from, to) = evaluation_window(application.start_date, application.end_date);
            self.shrinkage.snapshot(team_id, from, to).await?
        };

        let assessment = evaluate(&RuleInputs {
            leave_type: &leave_type,
            start: application.start_date,
            end: application.end_date,
            is_half_day: application.is_half_day,
            monthly_count,
            balance,
            snapshot: &snapshot,
            team_total_limit: team.total_limit(self.policy.daily_total_limit),
            policy: &self.policy,
        });

        debug!(
            user_id = %user.id,
            %leave_type,
            status = %assessment.status,
            reasons = assessment.reasons.len(),
            "Leave application assessed"
        );

        self.lifecycle
            .commit(Decision {
                user,
                application,
                original_leave_type,
                leave_type,
                conversion,
                assessment,
            })
            .await
    }
}
