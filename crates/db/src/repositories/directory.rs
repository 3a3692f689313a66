//! Directory repository for users and teams.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use leavedesk_core::LeaveError;
use leavedesk_core::directory::{Directory, Role, Team, User};
use leavedesk_shared::types::{TeamId, UserId};

use super::storage_error;
use crate::entities::{teams, users};

/// Directory repository backed by the `users` and `teams` tables.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    db: DatabaseConnection,
}

impl DirectoryRepository {
    /// Creates a new directory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a team.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_team(&self, team: &Team) -> Result<(), LeaveError> {
        teams::ActiveModel {
            id: Set(team.id.into_inner()),
            name: Set(team.name.clone()),
            shrinkage_limit: Set(team.shrinkage_limit),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_user(&self, user: &User) -> Result<(), LeaveError> {
        users::ActiveModel {
            id: Set(user.id.into_inner()),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            role: Set(user.role.as_str().to_string()),
            team_id: Set(user.team_id.map(TeamId::into_inner)),
            reports_to: Set(user.reports_to.map(UserId::into_inner)),
            is_active: Set(user.is_active),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

fn to_user(model: users::Model) -> Result<User, LeaveError> {
    let role = Role::parse(&model.role)
        .ok_or_else(|| LeaveError::Processing(format!("unknown role '{}' for user {}", model.role, model.id)))?;
    Ok(User {
        id: UserId::from_uuid(model.id),
        username: model.username,
        email: model.email,
        role,
        team_id: model.team_id.map(TeamId::from_uuid),
        reports_to: model.reports_to.map(UserId::from_uuid),
        is_active: model.is_active,
    })
}

fn to_team(model: teams::Model) -> Team {
    Team {
        id: TeamId::from_uuid(model.id),
        name: model.name,
        shrinkage_limit: model.shrinkage_limit,
    }
}

#[async_trait]
impl Directory for DirectoryRepository {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, LeaveError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .map(to_user)
            .transpose()
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>, LeaveError> {
        let team = teams::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(team.map(to_team))
    }

    async fn team_members(&self, team_id: TeamId) -> Result<Vec<User>, LeaveError> {
        users::Entity::find()
            .filter(users::Column::TeamId.eq(team_id.into_inner()))
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(to_user)
            .collect()
    }

    async fn direct_reports(&self, manager_id: UserId) -> Result<Vec<User>, LeaveError> {
        users::Entity::find()
            .filter(users::Column::ReportsTo.eq(manager_id.into_inner()))
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(to_user)
            .collect()
    }
}
