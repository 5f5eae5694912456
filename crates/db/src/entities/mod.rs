//! `SeaORM` entity definitions.

pub mod account_categories;
pub mod account_subcategories;
pub mod cash_balances;
pub mod cash_movements;
pub mod payments;
pub mod products;
pub mod sales;
pub mod sea_orm_active_enums;
pub mod service_requests;
pub mod users;
