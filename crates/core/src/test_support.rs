//! Fixtures shared by the async engine tests.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;

use leavedesk_shared::LeavePolicy;
use leavedesk_shared::types::{LeaveRequestId, TeamId, UserId};

use crate::decision::DecisionEngine;
use crate::directory::{Role, Team, User};
use crate::leave::store::LeaveStore;
use crate::leave::types::{LeaveApplication, LeaveRequest, LeaveStatus, LeaveType};
use crate::memory::{InMemoryStore, RecordingNotifier};
use crate::store::Stores;

/// A team with one manager and `n` associates, all balances at 20 days.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: DecisionEngine,
    pub team_id: TeamId,
    pub manager: User,
    pub associates: Vec<User>,
}

impl Fixture {
    pub fn new(n: usize) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let team_id = TeamId::new();
        store.add_team(Team {
            id: team_id,
            name: "Support".into(),
            shrinkage_limit: None,
        });

        let manager = User {
            id: UserId::new(),
            username: "manager".into(),
            email: "manager@company.com".into(),
            role: Role::Manager,
            team_id: Some(team_id),
            reports_to: None,
            is_active: true,
        };
        store.add_user(manager.clone());

        let associates: Vec<User> = (0..n)
            .map(|i| User {
                id: UserId::new(),
                username: format!("associate{i:02}"),
                email: format!("associate{i:02}@company.com"),
                role: Role::Associate,
                team_id: Some(team_id),
                reports_to: Some(manager.id),
                is_active: true,
            })
            .collect();
        for user in &associates {
            store.add_user(user.clone());
            for leave_type in [LeaveType::Annual, LeaveType::Casual, LeaveType::Sick, LeaveType::Optional] {
                store.set_balance(user.id, &leave_type, Decimal::from(20));
            }
        }

        let engine = DecisionEngine::new(
            Stores::from_backend(store.clone()),
            notifier.clone(),
            LeavePolicy::default(),
        );

        Self {
            store,
            notifier,
            engine,
            team_id,
            manager,
            associates,
        }
    }

    pub fn application(&self, who: usize, leave_type: &str, start: NaiveDate, end: NaiveDate) -> LeaveApplication {
        LeaveApplication {
            user_id: self.associates[who].id,
            leave_type: leave_type.to_string(),
            start_date: start,
            end_date: end,
            is_half_day: false,
            backup_person: Some("backup".into()),
            comments: None,
        }
    }

    /// Seeds an approved request directly, bypassing the engine.
    pub async fn seed_approved(&self, who: usize, leave_type: LeaveType, start: NaiveDate, end: NaiveDate) {
        let now = Utc::now();
        let request = LeaveRequest {
            id: LeaveRequestId::new(),
            user_id: self.associates[who].id,
            leave_type,
            start_date: start,
            end_date: end,
            is_half_day: false,
            status: LeaveStatus::Approved,
            backup_person: None,
            comments: None,
            consumes_ledger: false,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&request).await.unwrap();
    }
}

/// A weekday at least two weeks ahead, so tests never hit "start in past".
pub fn future_weekday(weekday: Weekday) -> NaiveDate {
    let mut date = Utc::now().date_naive().checked_add_days(Days::new(14)).unwrap();
    while date.weekday() != weekday {
        date = date.succ_opt().unwrap();
    }
    date
}

/// `date` plus `days`.
pub fn plus(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap()
}
