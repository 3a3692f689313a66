//! User and team directory.
//!
//! Read-only view of the organisation: who belongs to which team and who
//! reports to whom. A team's manager is derived from reporting lines, never
//! stored on the team.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leavedesk_shared::types::{TeamId, UserId};

use crate::leave::error::LeaveError;

/// Organisational role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Counted in team shrinkage; applies for leave.
    Associate,
    /// Approves or rejects requests of direct reports.
    Manager,
    /// Administrative account.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Associate => "associate",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "associate" => Some(Self::Associate),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directory user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Login name, also used as the audit actor.
    pub username: String,
    /// Notification address.
    pub email: String,
    /// Organisational role.
    pub role: Role,
    /// Team membership.
    pub team_id: Option<TeamId>,
    /// Direct manager.
    pub reports_to: Option<UserId>,
    /// Inactive users are ignored by shrinkage.
    pub is_active: bool,
}

impl User {
    /// Returns true if the user counts towards team shrinkage.
    #[must_use]
    pub fn is_counted_associate(&self) -> bool {
        self.is_active && self.role == Role::Associate
    }
}

/// A team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Overrides the daily total shrinkage limit when set.
    pub shrinkage_limit: Option<Decimal>,
}

impl Team {
    /// Daily total shrinkage limit for this team.
    #[must_use]
    pub fn total_limit(&self, default: Decimal) -> Decimal {
        self.shrinkage_limit.unwrap_or(default)
    }
}

/// Read-only user and team lookups.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Loads a user by id.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, LeaveError>;

    /// Loads a team by id.
    async fn find_team(&self, id: TeamId) -> Result<Option<Team>, LeaveError>;

    /// Every member of a team, any role.
    async fn team_members(&self, team_id: TeamId) -> Result<Vec<User>, LeaveError>;

    /// Users whose `reports_to` is `manager_id`.
    async fn direct_reports(&self, manager_id: UserId) -> Result<Vec<User>, LeaveError>;
}

/// Resolves who should review a user's requests.
///
/// The user's `reports_to` wins. Without one, falls back to the manager the
/// user's active teammates report to.
pub async fn resolve_manager(directory: &dyn Directory, user: &User) -> Result<Option<User>, LeaveError> {
    if let Some(manager_id) = user.reports_to {
        return directory.find_user(manager_id).await;
    }

    let Some(team_id) = user.team_id else {
        return Ok(None);
    };
    let members = directory.team_members(team_id).await?;
    let edge = members
        .iter()
        .filter(|m| m.id != user.id && m.is_counted_associate())
        .filter_map(|m| m.reports_to)
        .find(|manager_id| *manager_id != user.id);

    match edge {
        Some(manager_id) => directory.find_user(manager_id).await,
        None => Ok(None),
    }
}
