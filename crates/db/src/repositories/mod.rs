//! Repository implementations of the engine's store seams.
//!
//! Each repository wraps a `DatabaseConnection` and implements one trait
//! from `leavedesk-core`. Driver errors surface as `LeaveError::Processing`.

pub mod calendar;
pub mod directory;
pub mod leave;
pub mod ledger;

pub use calendar::CalendarRepository;
pub use directory::DirectoryRepository;
pub use leave::LeaveRepository;
pub use ledger::LedgerRepository;

use leavedesk_core::LeaveError;
use sea_orm::DbErr;

/// Folds a database error into the engine's error type.
pub(crate) fn storage_error(err: DbErr) -> LeaveError {
    tracing::error!(error = %err, "Database operation failed");
    LeaveError::Processing(err.to_string())
}
