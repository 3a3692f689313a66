//! Property-based tests for LeaveService.

use proptest::prelude::*;
use uuid::Uuid;

use leavedesk_shared::types::UserId;

use crate::leave::error::LeaveError;
use crate::leave::service::LeaveService;
use crate::leave::types::{LeaveAction, LeaveStatus};

fn arb_status() -> impl Strategy<Value = LeaveStatus> {
    prop_oneof![
        Just(LeaveStatus::Pending),
        Just(LeaveStatus::Approved),
        Just(LeaveStatus::Rejected),
        Just(LeaveStatus::Cancelled),
        Just(LeaveStatus::Deleted),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Manager actions succeed exactly from Pending.
    #[test]
    fn prop_review_only_from_pending(status in arb_status(), manager in arb_user()) {
        let approved = LeaveService::approve(status, manager);
        let rejected = LeaveService::reject(status, manager, None);
        if status == LeaveStatus::Pending {
            prop_assert_eq!(approved.unwrap().new_status(), LeaveStatus::Approved);
            prop_assert_eq!(rejected.unwrap().new_status(), LeaveStatus::Rejected);
        } else {
            let is_invalid_approve = matches!(approved, Err(LeaveError::InvalidTransition { .. }));
            let is_invalid_reject = matches!(rejected, Err(LeaveError::InvalidTransition { .. }));
            prop_assert!(is_invalid_approve);
            prop_assert!(is_invalid_reject);
        }
    }

    /// Ledger restoration happens only when leaving a consuming Approved state.
    #[test]
    fn prop_withdraw_restores_only_consuming_approval(
        status in arb_status(),
        delete in any::<bool>(),
        consumes in any::<bool>(),
    ) {
        let target = if delete { LeaveStatus::Deleted } else { LeaveStatus::Cancelled };
        match LeaveService::withdraw(status, target, consumes) {
            Ok(LeaveAction::Withdraw { new_status, restore_ledger }) => {
                prop_assert!(status.is_withdrawable());
                prop_assert_eq!(new_status, target);
                prop_assert_eq!(restore_ledger, status == LeaveStatus::Approved && consumes);
            }
            Ok(other) => prop_assert!(false, "unexpected action {:?}", other),
            Err(_) => prop_assert!(!status.is_withdrawable()),
        }
    }

    /// The service agrees with `can_transition` for every pair.
    #[test]
    fn prop_can_transition_matches_service(from in arb_status(), to in arb_status()) {
        let manager = UserId::new();
        let executed = match to {
            LeaveStatus::Approved => LeaveService::approve(from, manager).is_ok(),
            LeaveStatus::Rejected => LeaveService::reject(from, manager, None).is_ok(),
            LeaveStatus::Cancelled | LeaveStatus::Deleted => LeaveService::withdraw(from, to, false).is_ok(),
            LeaveStatus::Pending => false,
        };
        prop_assert_eq!(executed, LeaveService::can_transition(from, to));
    }

    /// Terminal states accept no further transitions.
    #[test]
    fn prop_terminal_states_are_final(to in arb_status()) {
        for from in [LeaveStatus::Rejected, LeaveStatus::Cancelled, LeaveStatus::Deleted] {
            prop_assert!(!LeaveService::can_transition(from, to));
        }
    }
}
