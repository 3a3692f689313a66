//! `SeaORM` entity definitions.

pub mod leave_balances;
pub mod leave_logs;
pub mod leave_requests;
pub mod monthly_quotas;
pub mod optional_leave_days;
pub mod teams;
pub mod users;
