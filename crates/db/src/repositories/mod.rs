//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Repositories that change entities with downstream ledger
//! effects return domain events for the automation engine instead of
//! firing side effects themselves.

#[cfg(test)]
mod ledger_chain_tests;

pub mod cash_balance;
pub mod cash_movement;
pub mod catalog;
pub mod payment;
pub mod report;
pub mod sale;
pub mod service_request;
pub mod user;

pub use cash_balance::{BalanceError, CashBalanceRepository};
pub use cash_movement::{
    CashMovementRepository, CreateMovementInput, MovementError, MovementFilter,
    UpdateMovementInput,
};
pub use catalog::{
    CatalogError, CatalogRepository, CreateCategoryInput, CreateProductInput,
    CreateSubcategoryInput, ServiceProductRefs,
};
pub use payment::{CreatePaymentInput, PaymentRepoError, PaymentRepository};
pub use report::{DashboardSummary, MovementReportFilter, ReportRepoError, ReportRepository};
pub use sale::{CreateSaleInput, SaleFilter, SaleRepoError, SaleRepository};
pub use service_request::{
    CreateServiceRequestInput, ServiceRequestError, ServiceRequestFilter, ServiceRequestRepository,
};
pub use user::{CreateUserInput, UserError, UserRepository};
