//! Leave request and audit log repository.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use leavedesk_core::leave::{LeaveLog, LeaveRequest, LeaveStatus, LeaveStore, LeaveType};
use leavedesk_core::LeaveError;
use leavedesk_shared::types::{LeaveLogId, LeaveRequestId, UserId};

use super::storage_error;
use crate::entities::{leave_logs, leave_requests};

/// Leave repository backed by `leave_requests` and `leave_logs`.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_request(model: leave_requests::Model) -> Result<LeaveRequest, LeaveError> {
    let status = LeaveStatus::parse(&model.status)
        .ok_or_else(|| LeaveError::Processing(format!("unknown status '{}' on leave {}", model.status, model.id)))?;
    Ok(LeaveRequest {
        id: LeaveRequestId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        leave_type: LeaveType::parse(&model.leave_type),
        start_date: model.start_date,
        end_date: model.end_date,
        is_half_day: model.is_half_day,
        status,
        backup_person: model.backup_person,
        comments: model.comments,
        consumes_ledger: model.consumes_ledger,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn to_requests(models: Vec<leave_requests::Model>) -> Result<Vec<LeaveRequest>, LeaveError> {
    models.into_iter().map(to_request).collect()
}

fn to_log(model: leave_logs::Model) -> LeaveLog {
    LeaveLog {
        id: LeaveLogId::from_uuid(model.id),
        leave_request_id: LeaveRequestId::from_uuid(model.leave_request_id),
        changed_by: model.changed_by,
        action: model.action,
        comments: model.comments,
        timestamp: model.created_at.with_timezone(&Utc),
    }
}

fn raw_ids(user_ids: &[UserId]) -> Vec<Uuid> {
    user_ids.iter().map(|id| id.into_inner()).collect()
}

#[async_trait]
impl LeaveStore for LeaveRepository {
    async fn insert(&self, request: &LeaveRequest) -> Result<(), LeaveError> {
        leave_requests::ActiveModel {
            id: Set(request.id.into_inner()),
            user_id: Set(request.user_id.into_inner()),
            leave_type: Set(request.leave_type.as_str().to_string()),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            is_half_day: Set(request.is_half_day),
            status: Set(request.status.as_str().to_string()),
            backup_person: Set(request.backup_person.clone()),
            comments: Set(request.comments.clone()),
            consumes_ledger: Set(request.consumes_ledger),
            created_at: Set(request.created_at.into()),
            updated_at: Set(request.updated_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn find(&self, id: LeaveRequestId) -> Result<Option<LeaveRequest>, LeaveError> {
        leave_requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .map(to_request)
            .transpose()
    }

    async fn update_status(
        &self,
        id: LeaveRequestId,
        expected: LeaveStatus,
        new: LeaveStatus,
        consumes_ledger: bool,
    ) -> Result<bool, LeaveError> {
        // Conditional on the current status so concurrent transitions race safely
        let result = leave_requests::Entity::update_many()
            .col_expr(leave_requests::Column::Status, Expr::value(new.as_str()))
            .col_expr(leave_requests::Column::ConsumesLedger, Expr::value(consumes_ledger))
            .col_expr(leave_requests::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(leave_requests::Column::Id.eq(id.into_inner()))
            .filter(leave_requests::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected == 1)
    }

    async fn update_details(&self, request: &LeaveRequest) -> Result<bool, LeaveError> {
        let result = leave_requests::Entity::update_many()
            .col_expr(leave_requests::Column::StartDate, Expr::value(request.start_date))
            .col_expr(leave_requests::Column::EndDate, Expr::value(request.end_date))
            .col_expr(
                leave_requests::Column::BackupPerson,
                Expr::value(request.backup_person.clone()),
            )
            .col_expr(leave_requests::Column::Comments, Expr::value(request.comments.clone()))
            .col_expr(leave_requests::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(leave_requests::Column::Id.eq(request.id.into_inner()))
            .filter(leave_requests::Column::Status.eq(LeaveStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected == 1)
    }

    async fn find_overlapping(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
        statuses: &[LeaveStatus],
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let models = leave_requests::Entity::find()
            .filter(leave_requests::Column::UserId.eq(user_id.into_inner()))
            .filter(leave_requests::Column::Status.is_in(statuses.iter().map(LeaveStatus::as_str)))
            .filter(leave_requests::Column::StartDate.lte(end))
            .filter(leave_requests::Column::EndDate.gte(start))
            .order_by_asc(leave_requests::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        to_requests(models)
    }

    async fn approved_in_range(
        &self,
        user_ids: &[UserId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = leave_requests::Entity::find()
            .filter(leave_requests::Column::UserId.is_in(raw_ids(user_ids)))
            .filter(leave_requests::Column::Status.eq(LeaveStatus::Approved.as_str()))
            .filter(leave_requests::Column::StartDate.lte(end))
            .filter(leave_requests::Column::EndDate.gte(start))
            .order_by_asc(leave_requests::Column::StartDate)
            .order_by_asc(leave_requests::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        to_requests(models)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<LeaveRequest>, LeaveError> {
        let models = leave_requests::Entity::find()
            .filter(leave_requests::Column::UserId.eq(user_id.into_inner()))
            .order_by_desc(leave_requests::Column::CreatedAt)
            .order_by_desc(leave_requests::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        to_requests(models)
    }

    async fn list_for_users_with_status(
        &self,
        user_ids: &[UserId],
        status: LeaveStatus,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = leave_requests::Entity::find()
            .filter(leave_requests::Column::UserId.is_in(raw_ids(user_ids)))
            .filter(leave_requests::Column::Status.eq(status.as_str()))
            .order_by_asc(leave_requests::Column::StartDate)
            .order_by_asc(leave_requests::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        to_requests(models)
    }

    async fn append_log(&self, log: &LeaveLog) -> Result<(), LeaveError> {
        leave_logs::ActiveModel {
            id: Set(log.id.into_inner()),
            leave_request_id: Set(log.leave_request_id.into_inner()),
            changed_by: Set(log.changed_by.clone()),
            action: Set(log.action.clone()),
            comments: Set(log.comments.clone()),
            created_at: Set(log.timestamp.into()),
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn logs_for(&self, id: LeaveRequestId) -> Result<Vec<LeaveLog>, LeaveError> {
        let models = leave_logs::Entity::find()
            .filter(leave_logs::Column::LeaveRequestId.eq(id.into_inner()))
            .order_by_asc(leave_logs::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(models.into_iter().map(to_log).collect())
    }
}
