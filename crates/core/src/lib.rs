//! Core business logic for Leavedesk.
//!
//! This crate contains the leave engine with ZERO web or database dependencies.
//! Durable state is reached through the async traits bundled in [`Stores`];
//! `leavedesk-db` implements them over SQL and [`memory`] implements them in
//! process.
//!
//! # Modules
//!
//! - `shrinkage` - Daily, weekly, monthly and forecast team shrinkage
//! - `ledger` - Leave balances and the monthly auto-approval quota
//! - `decision` - Rule evaluation for new leave applications
//! - `lifecycle` - Persisting decisions and manager or requester transitions
//! - `leave` - Leave request model and status state machine
//! - `directory` - Users, teams and manager resolution
//! - `calendar` - Optional holidays and working-day helpers
//! - `notification` - Associate and manager notifications
//! - `reports` - Pending approvals, balance summaries and history

pub mod calendar;
pub mod decision;
pub mod directory;
pub mod leave;
pub mod ledger;
pub mod lifecycle;
pub mod memory;
pub mod notification;
pub mod reports;
pub mod shrinkage;
pub mod store;

#[cfg(test)]
mod test_support;

pub use decision::{DecisionEngine, DecisionReason, Verdict, VerdictStatus};
pub use leave::{LeaveError, LeaveRequest, LeaveStatus, LeaveType};
pub use lifecycle::LifecycleManager;
pub use notification::{LeaveNotification, Notifier};
pub use reports::ReportService;
pub use shrinkage::ShrinkageCalculator;
pub use store::Stores;
