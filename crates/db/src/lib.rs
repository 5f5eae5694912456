//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - The ledger automation engine reacting to persistence events

pub mod automation;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use automation::{AutomationEngine, DomainEvent};
pub use repositories::{
    CashBalanceRepository, CashMovementRepository, CatalogRepository, PaymentRepository,
    ReportRepository, SaleRepository, ServiceRequestRepository, UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
