//! Leave request model and lifecycle state machine.
//!
//! # Modules
//!
//! - `types` - Leave domain types (LeaveType, LeaveStatus, LeaveRequest, LeaveLog)
//! - `error` - Leave error taxonomy
//! - `service` - Status transition rules
//! - `store` - Storage seam for requests and logs

pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LeaveError;
pub use service::LeaveService;
pub use store::LeaveStore;
pub use types::{
    LeaveAction, LeaveApplication, LeaveEdit, LeaveLog, LeaveRequest, LeaveStatus, LeaveType,
    day_count, ranges_overlap, span_days,
};
