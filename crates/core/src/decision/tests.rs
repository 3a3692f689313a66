//! Engine tests against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Utc, Weekday};
use rust_decimal_macros::dec;

use leavedesk_shared::LeavePolicy;
use leavedesk_shared::types::UserId;

use crate::decision::{DecisionEngine, DecisionReason, VerdictStatus};
use crate::directory::{Role, User};
use crate::leave::error::LeaveError;
use crate::leave::store::LeaveStore;
use crate::leave::types::{LeaveStatus, LeaveType};
use crate::ledger::store::LeaveLedger;
use crate::notification::{Audience, LeaveNotification, Notifier, NotifyError};
use crate::store::Stores;
use crate::test_support::{Fixture, future_weekday, plus};

#[tokio::test]
async fn test_quiet_team_auto_approves_annual() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let verdict = fx
        .engine
        .apply(fx.application(0, "AL", monday, plus(monday, 1)))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(verdict.reasons, vec![DecisionReason::WithinLimits]);
    let user = fx.associates[0].id;
    assert_eq!(fx.store.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(18));
    assert_eq!(fx.store.get_monthly_count(user).await.unwrap(), 1);

    let stored = fx.store.find(verdict.leave_id.unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Approved);
    assert!(stored.consumes_ledger);

    let sent = fx.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].audience, Audience::Associate);
    assert_eq!(sent[0].status, LeaveStatus::Approved);
}

#[tokio::test]
async fn test_long_casual_recorded_as_annual() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let verdict = fx
        .engine
        .apply(fx.application(0, "CL", monday, plus(monday, 2)))
        .await
        .unwrap();

    assert_eq!(verdict.original_leave_type, LeaveType::Casual);
    assert_eq!(verdict.leave_type, LeaveType::Annual);
    assert_eq!(verdict.reasons[0], DecisionReason::ConvertedToAnnual { days: 3 });

    let user = fx.associates[0].id;
    assert_eq!(fx.store.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(17));
    assert_eq!(fx.store.get_balance(user, &LeaveType::Casual).await.unwrap(), dec!(20));

    let logs = fx.store.logs_for(verdict.leave_id.unwrap()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].comments.contains("Requested CL, recorded as AL"));
}

#[tokio::test]
async fn test_two_day_casual_stays_casual() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let verdict = fx
        .engine
        .apply(fx.application(0, "cl", monday, plus(monday, 1)))
        .await
        .unwrap();
    assert_eq!(verdict.leave_type, LeaveType::Casual);
    assert_eq!(verdict.status, VerdictStatus::Approved);
}

#[tokio::test]
async fn test_planned_gate_routes_to_manager() {
    let fx = Fixture::new(25);
    let wednesday = future_weekday(Weekday::Wed);
    fx.seed_approved(1, LeaveType::Annual, wednesday, wednesday).await;
    fx.seed_approved(2, LeaveType::Annual, wednesday, wednesday).await;

    let verdict = fx
        .engine
        .apply(fx.application(0, "AL", wednesday, wednesday))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Pending);
    assert_eq!(
        verdict.reasons,
        vec![DecisionReason::DailyPlannedLimit {
            date: wednesday,
            pct: dec!(8),
            limit: dec!(7),
        }]
    );
    let user = fx.associates[0].id;
    assert_eq!(fx.store.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(20));
    assert_eq!(fx.store.get_monthly_count(user).await.unwrap(), 0);

    let sent = fx.notifier.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].audience, Audience::Associate);
    assert_eq!(sent[1].audience, Audience::Manager);
    assert_eq!(sent[1].recipient, "manager@company.com");
    assert!(sent[1].reason.as_deref().unwrap().contains("Planned shrinkage"));
}

#[tokio::test]
async fn test_three_day_optional_on_ordinary_days_rejected_silently() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let verdict = fx
        .engine
        .apply(fx.application(0, "Optional", monday, plus(monday, 2)))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Rejected);
    assert_eq!(verdict.reasons, vec![DecisionReason::OptionalSpanTooLong { days: 3, max: 2 }]);
    assert!(fx.notifier.sent().await.is_empty());

    let stored = fx.store.find(verdict.leave_id.unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.status, LeaveStatus::Rejected);
}

#[tokio::test]
async fn test_optional_on_holidays_skips_ledger() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    fx.store.add_optional_day(monday, "Festival");
    fx.store.add_optional_day(plus(monday, 1), "Festival");

    let verdict = fx
        .engine
        .apply(fx.application(0, "optional", monday, plus(monday, 1)))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(verdict.reasons, vec![DecisionReason::AllOptionalDays]);
    let user = fx.associates[0].id;
    assert_eq!(fx.store.get_balance(user, &LeaveType::Optional).await.unwrap(), dec!(20));
    assert_eq!(fx.store.get_monthly_count(user).await.unwrap(), 0);
    let stored = fx.store.find(verdict.leave_id.unwrap()).await.unwrap().unwrap();
    assert!(!stored.consumes_ledger);
}

#[tokio::test]
async fn test_sick_at_two_percent_approved() {
    let fx = Fixture::new(50);
    let thursday = future_weekday(Weekday::Thu);
    fx.seed_approved(1, LeaveType::Sick, thursday, thursday).await;

    let verdict = fx
        .engine
        .apply(fx.application(0, "sick", thursday, thursday))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Approved);
    let user = fx.associates[0].id;
    assert_eq!(fx.store.get_balance(user, &LeaveType::Sick).await.unwrap(), dec!(19));
    assert_eq!(fx.store.get_monthly_count(user).await.unwrap(), 1);
}

#[tokio::test]
async fn test_sick_at_limit_pending() {
    let fx = Fixture::new(20);
    let thursday = future_weekday(Weekday::Thu);
    fx.seed_approved(1, LeaveType::Sick, thursday, thursday).await;

    let verdict = fx
        .engine
        .apply(fx.application(0, "Sick", thursday, thursday))
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pending);
    assert!(verdict.has_reason(|r| matches!(r, DecisionReason::SickLimit { .. })));
}

#[tokio::test]
async fn test_monthly_cap_routes_to_manager() {
    let fx = Fixture::new(10);
    fx.store.set_monthly_count(fx.associates[0].id, 5);
    let monday = future_weekday(Weekday::Mon);

    let verdict = fx.engine.apply(fx.application(0, "AL", monday, monday)).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pending);
    assert_eq!(verdict.reasons, vec![DecisionReason::MonthlyCapReached { used: 5, cap: 5 }]);
}

#[tokio::test]
async fn test_insufficient_balance_routes_to_manager() {
    let fx = Fixture::new(10);
    fx.store.set_balance(fx.associates[0].id, &LeaveType::Annual, dec!(1));
    let monday = future_weekday(Weekday::Mon);

    let verdict = fx
        .engine
        .apply(fx.application(0, "AL", monday, plus(monday, 1)))
        .await
        .unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pending);
    assert!(verdict.has_reason(|r| matches!(r, DecisionReason::InsufficientBalance { .. })));
}

#[tokio::test]
async fn test_half_day_consumes_half() {
    let fx = Fixture::new(10);
    let tuesday = future_weekday(Weekday::Tue);
    let mut application = fx.application(0, "CL", tuesday, tuesday);
    application.is_half_day = true;

    let verdict = fx.engine.apply(application).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Approved);
    let user = fx.associates[0].id;
    assert_eq!(fx.store.get_balance(user, &LeaveType::Casual).await.unwrap(), dec!(19.5));
}

#[tokio::test]
async fn test_other_type_goes_to_manager() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let verdict = fx
        .engine
        .apply(fx.application(0, "Maternity", monday, plus(monday, 30)))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Pending);
    assert_eq!(verdict.leave_type, LeaveType::Other("Maternity".into()));
    assert_eq!(fx.notifier.sent().await.len(), 2);
}

#[tokio::test]
async fn test_overlapping_application_is_error_verdict() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    fx.engine
        .apply(fx.application(0, "AL", monday, plus(monday, 2)))
        .await
        .unwrap();
    let before = fx.store.request_count();

    let verdict = fx
        .engine
        .apply(fx.application(0, "CL", plus(monday, 2), plus(monday, 3)))
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::Error);
    assert!(verdict.leave_id.is_none());
    assert!(matches!(verdict.reasons[0], DecisionReason::Duplicate { .. }));
    assert_eq!(fx.store.request_count(), before);
}

#[tokio::test]
async fn test_cancelled_request_does_not_block_reapplication() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let first = fx.engine.apply(fx.application(0, "AL", monday, monday)).await.unwrap();
    fx.engine
        .lifecycle()
        .cancel(first.leave_id.unwrap(), fx.associates[0].id)
        .await
        .unwrap();

    let second = fx.engine.apply(fx.application(0, "AL", monday, monday)).await.unwrap();
    assert_eq!(second.status, VerdictStatus::Approved);
}

#[tokio::test]
async fn test_validation_failures_record_nothing() {
    let fx = Fixture::new(10);
    let monday = future_weekday(Weekday::Mon);
    let yesterday = Utc::now().date_naive().pred_opt().unwrap();

    let err = fx
        .engine
        .apply(fx.application(0, "AL", plus(monday, 1), monday))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::StartAfterEnd { .. }));

    let err = fx
        .engine
        .apply(fx.application(0, "AL", yesterday, monday))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::StartInPast(_)));

    let mut half = fx.application(0, "CL", monday, plus(monday, 1));
    half.is_half_day = true;
    assert!(matches!(fx.engine.apply(half).await.unwrap_err(), LeaveError::HalfDaySpan));

    let err = fx.engine.apply(fx.application(0, "  ", monday, monday)).await.unwrap_err();
    assert!(matches!(err, LeaveError::MissingField("leave_type")));

    let mut stranger = fx.application(0, "AL", monday, monday);
    stranger.user_id = UserId::new();
    assert!(matches!(
        fx.engine.apply(stranger).await.unwrap_err(),
        LeaveError::UserNotFound(_)
    ));

    let loner = User {
        id: UserId::new(),
        username: "loner".into(),
        email: "loner@company.com".into(),
        role: Role::Associate,
        team_id: None,
        reports_to: None,
        is_active: true,
    };
    fx.store.add_user(loner.clone());
    let mut teamless = fx.application(0, "AL", monday, monday);
    teamless.user_id = loner.id;
    let err = fx.engine.apply(teamless).await.unwrap_err();
    assert!(matches!(err, LeaveError::NoTeam(_)));
    assert!(err.is_validation());

    assert_eq!(fx.store.request_count(), 0);
}

struct Unreachable;

#[async_trait]
impl Notifier for Unreachable {
    async fn notify(&self, _notification: &LeaveNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("connection refused".into()))
    }
}

#[tokio::test]
async fn test_notification_failure_is_a_warning() {
    let fx = Fixture::new(10);
    let engine = DecisionEngine::new(
        Stores::from_backend(fx.store.clone()),
        Arc::new(Unreachable),
        LeavePolicy::default(),
    );
    fx.store.set_monthly_count(fx.associates[0].id, 5);
    let monday = future_weekday(Weekday::Mon);

    let verdict = engine.apply(fx.application(0, "AL", monday, monday)).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Pending);
    assert_eq!(verdict.warnings.len(), 2);
    assert!(fx.store.find(verdict.leave_id.unwrap()).await.unwrap().is_some());
}
