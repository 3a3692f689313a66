//! Ledger repository for leave balances and monthly auto-approval counters.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::debug;

use leavedesk_core::LeaveError;
use leavedesk_core::leave::LeaveType;
use leavedesk_core::ledger::{LeaveLedger, current_month_key};
use leavedesk_shared::types::UserId;

use super::storage_error;
use crate::entities::{leave_balances, monthly_quotas};

/// Ledger repository backed by `leave_balances` and `monthly_quotas`.
///
/// Every mutation is a single conditional statement, so concurrent callers
/// never overdraw a balance or lose a counter update.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or overwrites the balance of one leave type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert fails.
    pub async fn set_balance(&self, user_id: UserId, leave_type: &LeaveType, days: Decimal) -> Result<(), LeaveError> {
        let model = leave_balances::ActiveModel {
            user_id: Set(user_id.into_inner()),
            leave_type: Set(leave_type.as_str().to_string()),
            balance: Set(days),
            updated_at: Set(Utc::now().into()),
        };

        leave_balances::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([leave_balances::Column::UserId, leave_balances::Column::LeaveType])
                    .update_columns([leave_balances::Column::Balance, leave_balances::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl LeaveLedger for LedgerRepository {
    async fn get_balance(&self, user_id: UserId, leave_type: &LeaveType) -> Result<Decimal, LeaveError> {
        let record = leave_balances::Entity::find_by_id((user_id.into_inner(), leave_type.as_str().to_string()))
            .one(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(record.map_or(Decimal::ZERO, |r| r.balance))
    }

    async fn decrement_balance(
        &self,
        user_id: UserId,
        leave_type: &LeaveType,
        days: Decimal,
    ) -> Result<bool, LeaveError> {
        let result = leave_balances::Entity::update_many()
            .col_expr(
                leave_balances::Column::Balance,
                Expr::col(leave_balances::Column::Balance).sub(days),
            )
            .col_expr(leave_balances::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(leave_balances::Column::UserId.eq(user_id.into_inner()))
            .filter(leave_balances::Column::LeaveType.eq(leave_type.as_str()))
            .filter(leave_balances::Column::Balance.gte(days))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        let applied = result.rows_affected == 1;
        if !applied {
            debug!(%user_id, leave_type = %leave_type, %days, "Balance decrement refused");
        }
        Ok(applied)
    }

    async fn increment_balance(
        &self,
        user_id: UserId,
        leave_type: &LeaveType,
        days: Decimal,
    ) -> Result<(), LeaveError> {
        leave_balances::Entity::update_many()
            .col_expr(
                leave_balances::Column::Balance,
                Expr::col(leave_balances::Column::Balance).add(days),
            )
            .col_expr(leave_balances::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(leave_balances::Column::UserId.eq(user_id.into_inner()))
            .filter(leave_balances::Column::LeaveType.eq(leave_type.as_str()))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get_monthly_count(&self, user_id: UserId) -> Result<u32, LeaveError> {
        let record = monthly_quotas::Entity::find_by_id((user_id.into_inner(), current_month_key()))
            .one(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(record.map_or(0, |r| u32::try_from(r.approved_count).unwrap_or(0)))
    }

    async fn increment_monthly_count(&self, user_id: UserId) -> Result<(), LeaveError> {
        let month = current_month_key();

        // Make sure the row exists, then bump it in place
        monthly_quotas::Entity::insert(monthly_quotas::ActiveModel {
            user_id: Set(user_id.into_inner()),
            month: Set(month.clone()),
            approved_count: Set(0),
        })
        .on_conflict(
            OnConflict::columns([monthly_quotas::Column::UserId, monthly_quotas::Column::Month])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(storage_error)?;

        monthly_quotas::Entity::update_many()
            .col_expr(
                monthly_quotas::Column::ApprovedCount,
                Expr::col(monthly_quotas::Column::ApprovedCount).add(1),
            )
            .filter(monthly_quotas::Column::UserId.eq(user_id.into_inner()))
            .filter(monthly_quotas::Column::Month.eq(month))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn decrement_monthly_count(&self, user_id: UserId) -> Result<(), LeaveError> {
        monthly_quotas::Entity::update_many()
            .col_expr(
                monthly_quotas::Column::ApprovedCount,
                Expr::col(monthly_quotas::Column::ApprovedCount).sub(1),
            )
            .filter(monthly_quotas::Column::UserId.eq(user_id.into_inner()))
            .filter(monthly_quotas::Column::Month.eq(current_month_key()))
            .filter(monthly_quotas::Column::ApprovedCount.gt(0))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
