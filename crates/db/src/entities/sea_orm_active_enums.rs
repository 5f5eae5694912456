//! Database-backed enum types.
//!
//! Each enum maps onto a Postgres `CREATE TYPE ... AS ENUM` defined in the
//! initial migration. Conversions to and from the pure core enums live here
//! so repositories never match on raw strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use centralmei_core::cashbook::MovementDirection as CoreDirection;
use centralmei_core::payments::PaymentStatus as CorePaymentStatus;
use centralmei_core::request::{RequestStatus as CoreRequestStatus, ServiceKind as CoreServiceKind};
use centralmei_core::sales::{PaymentMethod as CorePaymentMethod, SaleStatus as CoreSaleStatus};

/// Lifecycle status of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_status")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, not yet picked up.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Being worked by staff.
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Service delivered.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned or refused.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<CoreRequestStatus> for RequestStatus {
    fn from(status: CoreRequestStatus) -> Self {
        match status {
            CoreRequestStatus::Pending => Self::Pending,
            CoreRequestStatus::Processing => Self::Processing,
            CoreRequestStatus::Completed => Self::Completed,
            CoreRequestStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RequestStatus> for CoreRequestStatus {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::Processing => Self::Processing,
            RequestStatus::Completed => Self::Completed,
            RequestStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Settlement status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sale_status")]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Awaiting payment.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid in full.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Cancelled before settlement.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<CoreSaleStatus> for SaleStatus {
    fn from(status: CoreSaleStatus) -> Self {
        match status {
            CoreSaleStatus::Pending => Self::Pending,
            CoreSaleStatus::Paid => Self::Paid,
            CoreSaleStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<SaleStatus> for CoreSaleStatus {
    fn from(status: SaleStatus) -> Self {
        match status {
            SaleStatus::Pending => Self::Pending,
            SaleStatus::Paid => Self::Paid,
            SaleStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// How a sale was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Credit card.
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Debit card.
    #[sea_orm(string_value = "debit_card")]
    DebitCard,
    /// PIX instant transfer.
    #[sea_orm(string_value = "pix")]
    Pix,
    /// Bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Boleto bancário.
    #[sea_orm(string_value = "boleto")]
    Boleto,
}

impl From<CorePaymentMethod> for PaymentMethod {
    fn from(method: CorePaymentMethod) -> Self {
        match method {
            CorePaymentMethod::Cash => Self::Cash,
            CorePaymentMethod::CreditCard => Self::CreditCard,
            CorePaymentMethod::DebitCard => Self::DebitCard,
            CorePaymentMethod::Pix => Self::Pix,
            CorePaymentMethod::BankTransfer => Self::BankTransfer,
            CorePaymentMethod::Boleto => Self::Boleto,
        }
    }
}

impl From<PaymentMethod> for CorePaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::CreditCard => Self::CreditCard,
            PaymentMethod::DebitCard => Self::DebitCard,
            PaymentMethod::Pix => Self::Pix,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::Boleto => Self::Boleto,
        }
    }
}

/// Direction of a cash movement; doubles as the kind of an account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_direction")]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Money entering the cash box.
    #[sea_orm(string_value = "in")]
    In,
    /// Money leaving the cash box.
    #[sea_orm(string_value = "out")]
    Out,
}

impl From<CoreDirection> for MovementDirection {
    fn from(direction: CoreDirection) -> Self {
        match direction {
            CoreDirection::In => Self::In,
            CoreDirection::Out => Self::Out,
        }
    }
}

impl From<MovementDirection> for CoreDirection {
    fn from(direction: MovementDirection) -> Self {
        match direction {
            MovementDirection::In => Self::In,
            MovementDirection::Out => Self::Out,
        }
    }
}

/// Canonical status of a gateway payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, buyer has not paid yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Gateway confirmed the charge.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Gateway refused the charge.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Cancelled before settlement.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Under gateway review.
    #[sea_orm(string_value = "in_process")]
    InProcess,
    /// Charge returned to the buyer.
    #[sea_orm(string_value = "refunded")]
    Refunded,
    /// Buyer disputed the charge.
    #[sea_orm(string_value = "charged_back")]
    ChargedBack,
}

impl From<CorePaymentStatus> for PaymentStatus {
    fn from(status: CorePaymentStatus) -> Self {
        match status {
            CorePaymentStatus::Pending => Self::Pending,
            CorePaymentStatus::Approved => Self::Approved,
            CorePaymentStatus::Rejected => Self::Rejected,
            CorePaymentStatus::Cancelled => Self::Cancelled,
            CorePaymentStatus::InProcess => Self::InProcess,
            CorePaymentStatus::Refunded => Self::Refunded,
            CorePaymentStatus::ChargedBack => Self::ChargedBack,
        }
    }
}

impl From<PaymentStatus> for CorePaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Approved => Self::Approved,
            PaymentStatus::Rejected => Self::Rejected,
            PaymentStatus::Cancelled => Self::Cancelled,
            PaymentStatus::InProcess => Self::InProcess,
            PaymentStatus::Refunded => Self::Refunded,
            PaymentStatus::ChargedBack => Self::ChargedBack,
        }
    }
}

/// The MEI bureaucratic service a payment covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "service_kind")]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Open a new MEI registration.
    #[sea_orm(string_value = "open_mei")]
    OpenMei,
    /// Regularize an existing MEI.
    #[sea_orm(string_value = "regularize_mei")]
    RegularizeMei,
    /// File the annual revenue declaration.
    #[sea_orm(string_value = "annual_declaration")]
    AnnualDeclaration,
    /// Close an MEI registration.
    #[sea_orm(string_value = "close_mei")]
    CloseMei,
}

impl From<CoreServiceKind> for ServiceKind {
    fn from(kind: CoreServiceKind) -> Self {
        match kind {
            CoreServiceKind::OpenMei => Self::OpenMei,
            CoreServiceKind::RegularizeMei => Self::RegularizeMei,
            CoreServiceKind::AnnualDeclaration => Self::AnnualDeclaration,
            CoreServiceKind::CloseMei => Self::CloseMei,
        }
    }
}

impl From<ServiceKind> for CoreServiceKind {
    fn from(kind: ServiceKind) -> Self {
        match kind {
            ServiceKind::OpenMei => Self::OpenMei,
            ServiceKind::RegularizeMei => Self::RegularizeMei,
            ServiceKind::AnnualDeclaration => Self::AnnualDeclaration,
            ServiceKind::CloseMei => Self::CloseMei,
        }
    }
}

/// Operating mode of the applicant's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "operating_mode")]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Fixed establishment.
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Internet sales.
    #[sea_orm(string_value = "internet")]
    Internet,
    /// Telesales.
    #[sea_orm(string_value = "telesales")]
    Telesales,
    /// Door-to-door sales.
    #[sea_orm(string_value = "door_to_door")]
    DoorToDoor,
    /// Mail order.
    #[sea_orm(string_value = "mail")]
    Mail,
    /// Fixed location outside a store.
    #[sea_orm(string_value = "fixed_external")]
    FixedExternal,
    /// Vending machines.
    #[sea_orm(string_value = "vending_machines")]
    VendingMachines,
}

impl From<centralmei_core::request::OperatingMode> for OperatingMode {
    fn from(mode: centralmei_core::request::OperatingMode) -> Self {
        use centralmei_core::request::OperatingMode as Core;
        match mode {
            Core::Fixed => Self::Fixed,
            Core::Internet => Self::Internet,
            Core::Telesales => Self::Telesales,
            Core::DoorToDoor => Self::DoorToDoor,
            Core::Mail => Self::Mail,
            Core::FixedExternal => Self::FixedExternal,
            Core::VendingMachines => Self::VendingMachines,
        }
    }
}

impl From<OperatingMode> for centralmei_core::request::OperatingMode {
    fn from(mode: OperatingMode) -> Self {
        use centralmei_core::request::OperatingMode as Core;
        match mode {
            OperatingMode::Fixed => Core::Fixed,
            OperatingMode::Internet => Core::Internet,
            OperatingMode::Telesales => Core::Telesales,
            OperatingMode::DoorToDoor => Core::DoorToDoor,
            OperatingMode::Mail => Core::Mail,
            OperatingMode::FixedExternal => Core::FixedExternal,
            OperatingMode::VendingMachines => Core::VendingMachines,
        }
    }
}
