//! Optional holiday calendar repository.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use leavedesk_core::LeaveError;
use leavedesk_core::calendar::OptionalCalendar;

use super::storage_error;
use crate::entities::optional_leave_days;

/// Calendar repository backed by `optional_leave_days`.
#[derive(Debug, Clone)]
pub struct CalendarRepository {
    db: DatabaseConnection,
}

impl CalendarRepository {
    /// Creates a new calendar repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Designates `date` as an optional holiday, renaming it if already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert fails.
    pub async fn add_optional_day(&self, date: NaiveDate, name: &str) -> Result<(), LeaveError> {
        optional_leave_days::Entity::insert(optional_leave_days::ActiveModel {
            date: Set(date),
            name: Set(name.to_string()),
        })
        .on_conflict(
            OnConflict::column(optional_leave_days::Column::Date)
                .update_column(optional_leave_days::Column::Name)
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl OptionalCalendar for CalendarRepository {
    async fn is_optional_day(&self, date: NaiveDate) -> Result<bool, LeaveError> {
        let day = optional_leave_days::Entity::find_by_id(date)
            .one(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(day.is_some())
    }

    async fn optional_days_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, LeaveError> {
        let days = optional_leave_days::Entity::find()
            .filter(optional_leave_days::Column::Date.between(start, end))
            .order_by_asc(optional_leave_days::Column::Date)
            .all(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(days.into_iter().map(|d| d.date).collect())
    }
}
