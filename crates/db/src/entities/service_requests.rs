//! `SeaORM` entity for the service_requests table (MEI registration requests).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{OperatingMode, RequestStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // Applicant
    pub full_name: String,
    #[sea_orm(unique)]
    pub cpf: String,
    pub rg: String,
    pub rg_issuer: String,
    pub rg_issuer_state: String,
    pub email: String,
    pub phone: String,

    // Business
    pub primary_cnae: String,
    pub secondary_cnaes: Option<String>,
    pub operating_mode: OperatingMode,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub starting_capital: Decimal,

    // Address
    pub cep: String,
    pub city: String,
    pub state: String,
    pub street: String,
    pub number: String,
    pub district: String,
    pub complement: Option<String>,

    // Control
    pub user_id: Option<Uuid>,
    pub status: RequestStatus,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub service_value: Decimal,
    pub sale_created: bool,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_one = "super::sales::Entity")]
    Sales,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
