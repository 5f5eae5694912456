//! `SeaORM` entity for the cash_movements table.
//!
//! `sale_id` is UNIQUE: a paid sale materializes at most one movement.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementDirection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub direction: MovementDirection,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    #[sea_orm(unique)]
    pub sale_id: Option<Uuid>,
    pub movement_date: Date,
    pub created_by: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_categories::Entity",
        from = "Column::CategoryId",
        to = "super::account_categories::Column::Id"
    )]
    AccountCategories,
    #[sea_orm(
        belongs_to = "super::account_subcategories::Entity",
        from = "Column::SubcategoryId",
        to = "super::account_subcategories::Column::Id"
    )]
    AccountSubcategories,
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sales,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::account_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountCategories.def()
    }
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

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
