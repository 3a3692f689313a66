//! Leave error types.
//!
//! Every fallible operation in the engine returns `LeaveError`. Storage
//! implementations fold their driver errors into `Processing`.

use chrono::NaiveDate;
use thiserror::Error;

use leavedesk_shared::types::{LeaveRequestId, TeamId, UserId};

use crate::leave::types::LeaveStatus;

/// Errors that can occur while deciding on or transitioning a leave request.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// A required field was absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The start date falls after the end date.
    #[error("Start date {start} is after end date {end}")]
    StartAfterEnd {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },

    /// The start date lies in the past.
    #[error("Start date {0} is in the past")]
    StartInPast(NaiveDate),

    /// A half-day request spans more than one day.
    #[error("Half-day leave must start and end on the same date")]
    HalfDaySpan,

    /// The requested calendar month does not exist.
    #[error("Invalid period {year}-{month}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested month (1-12).
        month: u32,
    },

    /// The user does not exist.
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// The user has no team, so shrinkage cannot be evaluated.
    #[error("User {0} is not assigned to a team")]
    NoTeam(UserId),

    /// The team does not exist.
    #[error("Team {0} not found")]
    TeamNotFound(TeamId),

    /// The leave request does not exist.
    #[error("Leave request {0} not found")]
    LeaveNotFound(LeaveRequestId),

    /// Only the requester may cancel, delete or edit a request.
    #[error("User {0} is not the requester of this leave")]
    NotRequester(UserId),

    /// Only the requester's direct manager may approve or reject.
    #[error("User {0} is not the direct manager of the requester")]
    NotDirectManager(UserId),

    /// The new date range collides with another active request.
    #[error("Leave overlaps existing request {0}")]
    Overlapping(LeaveRequestId),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: LeaveStatus,
        /// The attempted target status.
        to: LeaveStatus,
    },

    /// Storage or computation failure.
    #[error("Processing error: {0}")]
    Processing(String),
}

impl LeaveError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingField(_)
            | Self::StartAfterEnd { .. }
            | Self::StartInPast(_)
            | Self::HalfDaySpan
            | Self::InvalidPeriod { .. }
            | Self::NoTeam(_) => 400,

            Self::NotRequester(_) | Self::NotDirectManager(_) => 403,

            Self::UserNotFound(_) | Self::TeamNotFound(_) | Self::LeaveNotFound(_) => 404,

            Self::Overlapping(_) | Self::InvalidTransition { .. } => 409,

            Self::Processing(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::StartAfterEnd { .. } => "START_AFTER_END",
            Self::StartInPast(_) => "START_IN_PAST",
            Self::HalfDaySpan => "HALF_DAY_SPAN",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::NoTeam(_) => "NO_TEAM",
            Self::TeamNotFound(_) => "TEAM_NOT_FOUND",
            Self::LeaveNotFound(_) => "LEAVE_NOT_FOUND",
            Self::NotRequester(_) => "NOT_REQUESTER",
            Self::NotDirectManager(_) => "NOT_DIRECT_MANAGER",
            Self::Overlapping(_) => "LEAVE_OVERLAP",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Processing(_) => "PROCESSING_ERROR",
        }
    }

    /// Returns true for caller faults that left no state behind.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.status_code() == 400 || matches!(self, Self::UserNotFound(_))
    }
}
