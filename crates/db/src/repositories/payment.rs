//! Payment repository for gateway checkout records.
//!
//! Rows are keyed to the gateway by `external_reference`; webhook updates
//! land through [`PaymentRepository::apply_gateway_update`].

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use centralmei_core::payments::PaymentStatus;
use centralmei_core::request::ServiceKind;
use centralmei_shared::types::{ServiceRequestId, UserId};

use crate::entities::{payments, sea_orm_active_enums};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentRepoError {
    /// Payment not found by ID.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Payment not found by external reference.
    #[error("Payment not found for external reference: {0}")]
    UnknownReference(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Paying account, when logged in.
    pub user_id: Option<UserId>,
    /// Request this payment covers, when known.
    pub service_request_id: Option<ServiceRequestId>,
    /// The MEI service being paid for.
    pub service_kind: ServiceKind,
    /// Amount charged.
    pub amount: Decimal,
    /// Buyer name.
    pub customer_name: String,
    /// Buyer email.
    pub customer_email: String,
    /// Buyer phone.
    pub customer_phone: Option<String>,
    /// Unique gateway correlation key.
    pub external_reference: String,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a payment in pending status.
    pub async fn create(
        &self,
        input: CreatePaymentInput,
    ) -> Result<payments::Model, PaymentRepoError> {
        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id.map(UserId::into_inner)),
            service_request_id: Set(input.service_request_id.map(ServiceRequestId::into_inner)),
            service_kind: Set(input.service_kind.into()),
            amount: Set(input.amount),
            status: Set(sea_orm_active_enums::PaymentStatus::Pending),
            customer_name: Set(input.customer_name),
            customer_email: Set(input.customer_email),
            customer_phone: Set(input.customer_phone),
            gateway_payment_id: Set(None),
            gateway_preference_id: Set(None),
            external_reference: Set(input.external_reference),
            extra: Set(serde_json::json!({})),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(payment.insert(&self.db).await?)
    }

    /// Finds a payment by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<payments::Model>, PaymentRepoError> {
        Ok(payments::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds a payment by its gateway correlation key.
    pub async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<payments::Model>, PaymentRepoError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::ExternalReference.eq(external_reference))
            .one(&self.db)
            .await?)
    }

    /// Finds an existing pending payment for a user and request, used to
    /// re-enter an abandoned checkout instead of duplicating rows.
    pub async fn find_pending_for_request(
        &self,
        user_id: Uuid,
        service_request_id: Uuid,
    ) -> Result<Option<payments::Model>, PaymentRepoError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::UserId.eq(user_id))
            .filter(payments::Column::ServiceRequestId.eq(service_request_id))
            .filter(payments::Column::Status.eq(sea_orm_active_enums::PaymentStatus::Pending))
            .one(&self.db)
            .await?)
    }

    /// Stores the gateway preference created for a payment.
    pub async fn set_preference(
        &self,
        id: Uuid,
        preference_id: String,
    ) -> Result<payments::Model, PaymentRepoError> {
        let payment = self
            .find_by_id(id)
            .await?
            .ok_or(PaymentRepoError::NotFound(id))?;

        let mut active: payments::ActiveModel = payment.into();
        active.gateway_preference_id = Set(Some(preference_id));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Applies a gateway status update keyed by external reference.
    ///
    /// # Errors
    ///
    /// Returns `PaymentRepoError::UnknownReference` when no payment carries
    /// the reference.
    pub async fn apply_gateway_update(
        &self,
        external_reference: &str,
        status: PaymentStatus,
        gateway_payment_id: Option<String>,
        extra: Option<serde_json::Value>,
    ) -> Result<payments::Model, PaymentRepoError> {
        let payment = self
            .find_by_external_reference(external_reference)
            .await?
            .ok_or_else(|| PaymentRepoError::UnknownReference(external_reference.to_string()))?;

        let mut active: payments::ActiveModel = payment.into();
        active.status = Set(status.into());
        if let Some(gateway_payment_id) = gateway_payment_id {
            active.gateway_payment_id = Set(Some(gateway_payment_id));
        }
        if let Some(extra) = extra {
            active.extra = Set(extra);
        }
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }
}
