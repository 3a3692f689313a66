//! Manager and associate reports.
//!
//! - `types` - Report payloads
//! - `service` - Report generation over the stores

pub mod service;
pub mod types;


pub use service::{ReportService, SUMMARY_TYPES};
pub use types::{BalanceSummary, LeaveHistoryEntry, OnLeaveEntry, PendingApproval, TypeBalance};
