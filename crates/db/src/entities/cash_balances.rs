//! `SeaORM` entity for the cash_balances table.
//!
//! One row per calendar date, always derivable from that date's movements
//! and the closing balance of the most recent prior date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub date: Date,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_in: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_out: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub closing_balance: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
