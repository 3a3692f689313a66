//! Storage bundle handed to the engine components.

use std::sync::Arc;

use crate::calendar::OptionalCalendar;
use crate::directory::Directory;
use crate::leave::store::LeaveStore;
use crate::ledger::store::LeaveLedger;

/// The durable collaborators every engine component reads from.
///
/// Components hold a clone of this bundle and re-read state on every call;
/// nothing is cached between calls.
#[derive(Clone)]
pub struct Stores {
    /// Users and teams.
    pub directory: Arc<dyn Directory>,
    /// Leave requests and audit logs.
    pub leaves: Arc<dyn LeaveStore>,
    /// Balances and monthly counters.
    pub ledger: Arc<dyn LeaveLedger>,
    /// Optional holidays.
    pub calendar: Arc<dyn OptionalCalendar>,
}

impl Stores {
    /// Builds a bundle where one backend serves every seam.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: Directory + LeaveStore + LeaveLedger + OptionalCalendar + 'static,
    {
        Self {
            directory: backend.clone(),
            leaves: backend.clone(),
            ledger: backend.clone(),
            calendar: backend,
        }
    }
}
