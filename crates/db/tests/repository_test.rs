//! Integration tests for the SQL repositories against in-memory SQLite.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use leavedesk_core::calendar::OptionalCalendar;
use leavedesk_core::directory::{Directory, Role, Team, User};
use leavedesk_core::leave::{LeaveApplication, LeaveLog, LeaveRequest, LeaveStatus, LeaveStore, LeaveType};
use leavedesk_core::ledger::LeaveLedger;
use leavedesk_core::memory::RecordingNotifier;
use leavedesk_core::{DecisionEngine, VerdictStatus};
use leavedesk_db::migration::Migrator;
use leavedesk_db::{CalendarRepository, DirectoryRepository, LeaveRepository, LedgerRepository};
use leavedesk_shared::LeavePolicy;
use leavedesk_shared::types::{LeaveRequestId, TeamId, UserId};

async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("Failed to open SQLite");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}

/// Seeds a team with a manager and `n` associates.
async fn seed_team(db: &DatabaseConnection, n: usize) -> (TeamId, User, Vec<User>) {
    let directory = DirectoryRepository::new(db.clone());
    let team_id = TeamId::new();
    directory
        .create_team(&Team {
            id: team_id,
            name: format!("Team {team_id}"),
            shrinkage_limit: None,
        })
        .await
        .expect("Failed to create team");

    let manager = User {
        id: UserId::new(),
        username: format!("manager-{team_id}"),
        email: "manager@company.com".into(),
        role: Role::Manager,
        team_id: Some(team_id),
        reports_to: None,
        is_active: true,
    };
    directory.create_user(&manager).await.expect("Failed to create manager");

    let mut associates = Vec::with_capacity(n);
    for i in 0..n {
        let user = User {
            id: UserId::new(),
            username: format!("associate{i:02}-{team_id}"),
            email: format!("associate{i:02}@company.com"),
            role: Role::Associate,
            team_id: Some(team_id),
            reports_to: Some(manager.id),
            is_active: true,
        };
        directory.create_user(&user).await.expect("Failed to create associate");
        associates.push(user);
    }
    (team_id, manager, associates)
}

fn request(user_id: UserId, leave_type: LeaveType, start: NaiveDate, end: NaiveDate, status: LeaveStatus) -> LeaveRequest {
    let now = Utc::now();
    LeaveRequest {
        id: LeaveRequestId::new(),
        user_id,
        leave_type,
        start_date: start,
        end_date: end,
        is_half_day: false,
        status,
        backup_person: Some("backup".into()),
        comments: None,
        consumes_ledger: false,
        created_at: now,
        updated_at: now,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn future_weekday(weekday: Weekday) -> NaiveDate {
    let mut day = Utc::now().date_naive().checked_add_days(Days::new(14)).unwrap();
    while day.weekday() != weekday {
        day = day.succ_opt().unwrap();
    }
    day
}

#[tokio::test]
async fn test_directory_round_trip() {
    let db = setup().await;
    let (team_id, manager, associates) = seed_team(&db, 3).await;
    let directory = DirectoryRepository::new(db.clone());

    let found = directory
        .find_user(associates[0].id)
        .await
        .expect("Failed to find user")
        .expect("User should exist");
    assert_eq!(found, associates[0]);

    let team = directory.find_team(team_id).await.unwrap().expect("Team should exist");
    assert_eq!(team.shrinkage_limit, None);

    let members = directory.team_members(team_id).await.unwrap();
    assert_eq!(members.len(), 4);

    let reports = directory.direct_reports(manager.id).await.unwrap();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|u| u.role == Role::Associate));

    assert!(directory.find_user(UserId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_status_update_is_compare_and_set() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 1).await;
    let repo = LeaveRepository::new(db.clone());

    let pending = request(
        associates[0].id,
        LeaveType::Annual,
        date(2026, 11, 2),
        date(2026, 11, 3),
        LeaveStatus::Pending,
    );
    repo.insert(&pending).await.expect("Failed to insert request");

    let first = repo
        .update_status(pending.id, LeaveStatus::Pending, LeaveStatus::Approved, true)
        .await
        .unwrap();
    let second = repo
        .update_status(pending.id, LeaveStatus::Pending, LeaveStatus::Rejected, false)
        .await
        .unwrap();
    assert!(first);
    assert!(!second);

    let stored = repo.find(pending.id).await.unwrap().expect("Request should exist");
    assert_eq!(stored.status, LeaveStatus::Approved);
    assert!(stored.consumes_ledger);
    assert_eq!(stored.leave_type, LeaveType::Annual);

    // Details can only change while Pending
    let mut edited = stored.clone();
    edited.end_date = date(2026, 11, 4);
    assert!(!repo.update_details(&edited).await.unwrap());
}

#[tokio::test]
async fn test_overlap_and_range_queries() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 2).await;
    let repo = LeaveRepository::new(db.clone());
    let a = associates[0].id;
    let b = associates[1].id;

    let approved = request(a, LeaveType::Annual, date(2026, 11, 2), date(2026, 11, 4), LeaveStatus::Approved);
    let cancelled = request(a, LeaveType::Casual, date(2026, 11, 3), date(2026, 11, 3), LeaveStatus::Cancelled);
    let sick = request(b, LeaveType::Sick, date(2026, 11, 4), date(2026, 11, 6), LeaveStatus::Approved);
    for r in [&approved, &cancelled, &sick] {
        repo.insert(r).await.unwrap();
    }

    let active = [LeaveStatus::Pending, LeaveStatus::Approved];
    let overlapping = repo
        .find_overlapping(a, date(2026, 11, 4), date(2026, 11, 10), &active)
        .await
        .unwrap();
    assert_eq!(overlapping.len(), 1);
    assert_eq!(overlapping[0].id, approved.id);

    let none = repo
        .find_overlapping(a, date(2026, 11, 5), date(2026, 11, 10), &active)
        .await
        .unwrap();
    assert!(none.is_empty());

    let in_range = repo
        .approved_in_range(&[a, b], date(2026, 11, 4), date(2026, 11, 4))
        .await
        .unwrap();
    assert_eq!(in_range.len(), 2);
    assert_eq!(in_range[0].id, approved.id);

    assert!(repo.approved_in_range(&[], date(2026, 11, 1), date(2026, 11, 30)).await.unwrap().is_empty());

    let cancelled_only = repo
        .list_for_users_with_status(&[a, b], LeaveStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled_only.len(), 1);
    assert_eq!(repo.list_for_user(a).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_logs_in_append_order() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 1).await;
    let repo = LeaveRepository::new(db.clone());
    let pending = request(
        associates[0].id,
        LeaveType::Casual,
        date(2026, 11, 2),
        date(2026, 11, 2),
        LeaveStatus::Pending,
    );
    repo.insert(&pending).await.unwrap();

    repo.append_log(&LeaveLog::new(pending.id, "system", "Pending", "Needs review"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    repo.append_log(&LeaveLog::new(pending.id, "manager", "Approved", "ok"))
        .await
        .unwrap();

    let logs = repo.logs_for(pending.id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action, "Pending");
    assert_eq!(logs[1].changed_by, "manager");
}

#[tokio::test]
async fn test_balance_decrement_never_overdraws() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 1).await;
    let ledger = LedgerRepository::new(db.clone());
    let user = associates[0].id;

    assert_eq!(ledger.get_balance(user, &LeaveType::Annual).await.unwrap(), Decimal::ZERO);
    assert!(!ledger.decrement_balance(user, &LeaveType::Annual, dec!(1)).await.unwrap());

    ledger.set_balance(user, &LeaveType::Annual, dec!(2)).await.unwrap();
    assert!(ledger.decrement_balance(user, &LeaveType::Annual, dec!(1.5)).await.unwrap());
    assert!(!ledger.decrement_balance(user, &LeaveType::Annual, dec!(1)).await.unwrap());
    assert_eq!(ledger.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(0.5));

    ledger.increment_balance(user, &LeaveType::Annual, dec!(1.5)).await.unwrap();
    assert_eq!(ledger.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(2));

    // No record, no effect
    ledger.increment_balance(user, &LeaveType::Sick, dec!(3)).await.unwrap();
    assert_eq!(ledger.get_balance(user, &LeaveType::Sick).await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_concurrent_decrements() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 1).await;
    let ledger = Arc::new(LedgerRepository::new(db.clone()));
    let user = associates[0].id;
    ledger.set_balance(user, &LeaveType::Casual, dec!(20)).await.unwrap();

    let attempts = (0..10).map(|_| {
        let ledger = ledger.clone();
        async move { ledger.decrement_balance(user, &LeaveType::Casual, dec!(3)).await.unwrap() }
    });
    let succeeded = join_all(attempts).await.into_iter().filter(|ok| *ok).count();

    assert_eq!(succeeded, 6);
    assert_eq!(ledger.get_balance(user, &LeaveType::Casual).await.unwrap(), dec!(2));
}

#[tokio::test]
async fn test_monthly_count_floors_at_zero() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 1).await;
    let ledger = LedgerRepository::new(db.clone());
    let user = associates[0].id;

    assert_eq!(ledger.get_monthly_count(user).await.unwrap(), 0);
    ledger.decrement_monthly_count(user).await.unwrap();
    assert_eq!(ledger.get_monthly_count(user).await.unwrap(), 0);

    ledger.increment_monthly_count(user).await.unwrap();
    ledger.increment_monthly_count(user).await.unwrap();
    assert_eq!(ledger.get_monthly_count(user).await.unwrap(), 2);

    ledger.decrement_monthly_count(user).await.unwrap();
    ledger.decrement_monthly_count(user).await.unwrap();
    ledger.decrement_monthly_count(user).await.unwrap();
    assert_eq!(ledger.get_monthly_count(user).await.unwrap(), 0);
}

#[tokio::test]
async fn test_optional_days() {
    let db = setup().await;
    let calendar = CalendarRepository::new(db.clone());
    calendar.add_optional_day(date(2026, 11, 9), "Festival").await.unwrap();
    calendar.add_optional_day(date(2026, 11, 9), "Festival of Lights").await.unwrap();
    calendar.add_optional_day(date(2026, 11, 30), "Founders Day").await.unwrap();

    assert!(calendar.is_optional_day(date(2026, 11, 9)).await.unwrap());
    assert!(!calendar.is_optional_day(date(2026, 11, 10)).await.unwrap());

    let days = calendar
        .optional_days_between(date(2026, 11, 1), date(2026, 11, 30))
        .await
        .unwrap();
    assert_eq!(days.len(), 2);
    assert!(days.contains(&date(2026, 11, 30)));
}

#[tokio::test]
async fn test_engine_over_sql_stores() {
    let db = setup().await;
    let (_, _, associates) = seed_team(&db, 10).await;
    let ledger = LedgerRepository::new(db.clone());
    let user = associates[0].id;
    ledger.set_balance(user, &LeaveType::Annual, dec!(20)).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let engine = DecisionEngine::new(leavedesk_db::stores(&db), notifier.clone(), LeavePolicy::default());

    let monday = future_weekday(Weekday::Mon);
    let verdict = engine
        .apply(LeaveApplication {
            user_id: user,
            leave_type: "AL".into(),
            start_date: monday,
            end_date: monday.succ_opt().unwrap(),
            is_half_day: false,
            backup_person: Some("backup".into()),
            comments: None,
        })
        .await
        .expect("Engine should decide");

    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(ledger.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(18));
    assert_eq!(ledger.get_monthly_count(user).await.unwrap(), 1);

    let leave_id = verdict.leave_id.expect("Approved verdict carries an id");
    engine.lifecycle().cancel(leave_id, user).await.expect("Requester may cancel");
    assert_eq!(ledger.get_balance(user, &LeaveType::Annual).await.unwrap(), dec!(20));
    assert_eq!(ledger.get_monthly_count(user).await.unwrap(), 0);

    let logs = LeaveRepository::new(db.clone()).logs_for(leave_id).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(notifier.sent().await.len(), 1);
}
