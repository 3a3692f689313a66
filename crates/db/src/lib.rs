//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository implementations of the `leavedesk-core` store seams
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

pub use repositories::{CalendarRepository, DirectoryRepository, LeaveRepository, LedgerRepository};

use leavedesk_core::Stores;
use leavedesk_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the configured database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to database"
    );
    Database::connect(options).await
}

/// Builds the engine's store bundle over one connection pool.
#[must_use]
pub fn stores(db: &DatabaseConnection) -> Stores {
    Stores {
        directory: Arc::new(DirectoryRepository::new(db.clone())),
        leaves: Arc::new(LeaveRepository::new(db.clone())),
        ledger: Arc::new(LedgerRepository::new(db.clone())),
        calendar: Arc::new(CalendarRepository::new(db.clone())),
    }
}
