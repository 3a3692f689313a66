//! Property-based tests for shrinkage arithmetic.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use leavedesk_shared::types::{LeaveRequestId, TeamId, UserId};

use crate::calendar::dates_between;
use crate::directory::{Role, User};
use crate::leave::types::{LeaveRequest, LeaveStatus, LeaveType, ranges_overlap};
use crate::shrinkage::math::TeamSnapshot;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).unwrap_or_default()
}

fn offset(days: u64) -> NaiveDate {
    base().checked_add_days(Days::new(days)).unwrap_or_default()
}

fn arb_leave_type() -> impl Strategy<Value = LeaveType> {
    prop_oneof![
        Just(LeaveType::Annual),
        Just(LeaveType::Casual),
        Just(LeaveType::Sick),
        Just(LeaveType::Other("Maternity".to_string())),
    ]
}

/// (start offset, length, half day, type) per associate; at most one leave each.
fn arb_team() -> impl Strategy<Value = Vec<Option<(u64, u64, bool, LeaveType)>>> {
    prop::collection::vec(
        prop::option::of((0u64..20, 0u64..6, any::<bool>(), arb_leave_type())),
        0..15,
    )
}

fn build(team: &[Option<(u64, u64, bool, LeaveType)>]) -> TeamSnapshot {
    let team_id = TeamId::new();
    let mut snapshot = TeamSnapshot::default();
    for (i, leave) in team.iter().enumerate() {
        let user = User {
            id: UserId::new(),
            username: format!("a{i}"),
            email: format!("a{i}@company.com"),
            role: Role::Associate,
            team_id: Some(team_id),
            reports_to: None,
            is_active: true,
        };
        if let Some((start, len, half, leave_type)) = leave {
            let start_date = offset(*start);
            let end_date = if *half { start_date } else { offset(start + len) };
            snapshot.leaves.push(LeaveRequest {
                id: LeaveRequestId::new(),
                user_id: user.id,
                leave_type: leave_type.clone(),
                start_date,
                end_date,
                is_half_day: *half,
                status: LeaveStatus::Approved,
                backup_person: None,
                comments: None,
                consumes_ledger: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        }
        snapshot.associates.push(user);
    }
    snapshot
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Daily figures stay within [0, 100] and total is the bucket sum.
    #[test]
    fn prop_daily_bounded_and_additive(team in arb_team(), day in 0u64..26) {
        let snapshot = build(&team);
        let s = snapshot.daily(offset(day));
        prop_assert!(s.planned_pct >= Decimal::ZERO);
        prop_assert!(s.sick_pct >= Decimal::ZERO);
        prop_assert!(s.total_pct <= Decimal::ONE_HUNDRED + Decimal::new(1, 2));
        prop_assert_eq!(s.total_pct, s.planned_pct + s.sick_pct);
    }

    /// An optional holiday zeroes the day regardless of leave.
    #[test]
    fn prop_optional_day_always_zero(team in arb_team(), day in 0u64..26) {
        let mut snapshot = build(&team);
        let date = offset(day);
        snapshot.optional_days = BTreeSet::from([date]);
        let s = snapshot.daily(date);
        prop_assert_eq!(s.total_pct, Decimal::ZERO);
    }

    /// Range shrinkage stays within [0, 100] when each associate has one leave.
    #[test]
    fn prop_range_bounded(team in arb_team(), start in 0u64..20, len in 0u64..14) {
        let snapshot = build(&team);
        let pct = snapshot.range_shrinkage(offset(start), offset(start + len));
        prop_assert!(pct >= Decimal::ZERO);
        prop_assert!(pct <= Decimal::ONE_HUNDRED);
    }

    /// Overlap is symmetric and agrees with the existence of a shared date.
    #[test]
    fn prop_overlap_matches_shared_date(a in 0u64..15, al in 0u64..5, b in 0u64..15, bl in 0u64..5) {
        let (a_start, a_end) = (offset(a), offset(a + al));
        let (b_start, b_end) = (offset(b), offset(b + bl));
        let shared = dates_between(a_start, a_end).any(|d| d >= b_start && d <= b_end);
        prop_assert_eq!(ranges_overlap(a_start, a_end, b_start, b_end), shared);
        prop_assert_eq!(
            ranges_overlap(a_start, a_end, b_start, b_end),
            ranges_overlap(b_start, b_end, a_start, a_end)
        );
    }
}
