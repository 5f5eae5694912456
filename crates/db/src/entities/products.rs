//! `SeaORM` entity for the products table (products and services sold).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub is_active: bool,
    pub subcategory_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_subcategories::Entity",
        from = "Column::SubcategoryId",
        to = "super::account_subcategories::Column::Id"
    )]
    AccountSubcategories,
    #[sea_orm(has_many = "super::sales::Entity")]
    Sales,
}

impl Related<super::account_subcategories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountSubcategories.def()
    }
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
