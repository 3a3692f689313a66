//! Leave schema: directory, requests, audit logs, ledger and calendar.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: DIRECTORY
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Teams::ShrinkageLimit).decimal_len(5, 2).null())
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string_len(20).not_null())
                    .col(ColumnDef::new(Users::TeamId).uuid().null())
                    .col(ColumnDef::new(Users::ReportsTo).uuid().null())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_team")
                            .from(Users::Table, Users::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_reports_to")
                            .from(Users::Table, Users::ReportsTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_team")
                    .table(Users::Table)
                    .col(Users::TeamId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: LEAVE REQUESTS & AUDIT LOG
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(LeaveRequests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeaveRequests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LeaveRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(LeaveRequests::LeaveType).string_len(50).not_null())
                    .col(ColumnDef::new(LeaveRequests::StartDate).date().not_null())
                    .col(ColumnDef::new(LeaveRequests::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(LeaveRequests::IsHalfDay)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LeaveRequests::Status).string_len(20).not_null())
                    .col(ColumnDef::new(LeaveRequests::BackupPerson).string_len(100).null())
                    .col(ColumnDef::new(LeaveRequests::Comments).text().null())
                    .col(
                        ColumnDef::new(LeaveRequests::ConsumesLedger)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LeaveRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_requests_user")
                            .from(LeaveRequests::Table, LeaveRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap checks and a user's history
        manager
            .create_index(
                Index::create()
                    .name("idx_leave_requests_user_dates")
                    .table(LeaveRequests::Table)
                    .col(LeaveRequests::UserId)
                    .col(LeaveRequests::StartDate)
                    .to_owned(),
            )
            .await?;

        // Shrinkage scans over approved leave
        manager
            .create_index(
                Index::create()
                    .name("idx_leave_requests_status_dates")
                    .table(LeaveRequests::Table)
                    .col(LeaveRequests::Status)
                    .col(LeaveRequests::StartDate)
                    .col(LeaveRequests::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeaveLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeaveLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LeaveLogs::LeaveRequestId).uuid().not_null())
                    .col(ColumnDef::new(LeaveLogs::ChangedBy).string_len(100).not_null())
                    .col(ColumnDef::new(LeaveLogs::Action).string_len(50).not_null())
                    .col(ColumnDef::new(LeaveLogs::Comments).text().not_null())
                    .col(
                        ColumnDef::new(LeaveLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_logs_request")
                            .from(LeaveLogs::Table, LeaveLogs::LeaveRequestId)
                            .to(LeaveRequests::Table, LeaveRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leave_logs_request")
                    .table(LeaveLogs::Table)
                    .col(LeaveLogs::LeaveRequestId)
                    .col(LeaveLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(LeaveBalances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LeaveBalances::UserId).uuid().not_null())
                    .col(ColumnDef::new(LeaveBalances::LeaveType).string_len(50).not_null())
                    .col(ColumnDef::new(LeaveBalances::Balance).decimal_len(6, 2).not_null())
                    .col(
                        ColumnDef::new(LeaveBalances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(LeaveBalances::UserId)
                            .col(LeaveBalances::LeaveType),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_leave_balances_user")
                            .from(LeaveBalances::Table, LeaveBalances::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MonthlyQuotas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MonthlyQuotas::UserId).uuid().not_null())
                    .col(ColumnDef::new(MonthlyQuotas::Month).string_len(7).not_null())
                    .col(
                        ColumnDef::new(MonthlyQuotas::ApprovedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(MonthlyQuotas::UserId)
                            .col(MonthlyQuotas::Month),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monthly_quotas_user")
                            .from(MonthlyQuotas::Table, MonthlyQuotas::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: CALENDAR
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(OptionalLeaveDays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OptionalLeaveDays::Date)
                            .date()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OptionalLeaveDays::Name).string_len(100).not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OptionalLeaveDays::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyQuotas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaveBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaveLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeaveRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    ShrinkageLimit,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Role,
    TeamId,
    ReportsTo,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LeaveRequests {
    Table,
    Id,
    UserId,
    LeaveType,
    StartDate,
    EndDate,
    IsHalfDay,
    Status,
    BackupPerson,
    Comments,
    ConsumesLedger,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeaveLogs {
    Table,
    Id,
    LeaveRequestId,
    ChangedBy,
    Action,
    Comments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LeaveBalances {
    Table,
    UserId,
    LeaveType,
    Balance,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MonthlyQuotas {
    Table,
    UserId,
    Month,
    ApprovedCount,
}

#[derive(DeriveIden)]
enum OptionalLeaveDays {
    Table,
    Date,
    Name,
}
