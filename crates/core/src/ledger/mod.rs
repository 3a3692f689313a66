//! Balance and quota ledger.
//!
//! Per-user, per-leave-type day balances plus the monthly FCFS
//! auto-approval counter.
//!
//! # Modules
//!
//! - `store` - Storage seam for balances and counters
//! - `quota` - Month keys and remaining-quota arithmetic

pub mod quota;
pub mod store;

pub use quota::{current_month_key, month_key, remaining_quota};
pub use store::LeaveLedger;
