//! Leave lifecycle: committing verdicts, manager review, withdrawal and edits.
//!
//! Every transition appends exactly one audit log entry. Ledger effects
//! are paired through the request's `consumes_ledger` flag and a
//! compare-and-set on its status, so a consumption is restored at most once.

pub mod manager;

pub use manager::{Decision, LifecycleManager, SYSTEM_ACTOR, validate_dates};
