//! Service-request repository.
//!
//! `set_status` is the lifecycle entry point: it loads the stored status,
//! persists the new one, and hands the caller a [`RequestCompleted`] event
//! when the transition concluded the request. The previous-status
//! comparison happens inside the one call, so no state is shared across
//! requests.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use centralmei_core::request::{OperatingMode, RequestCompleted, RequestStatus};
use centralmei_shared::types::{ServiceRequestId, UserId};

use crate::entities::{sea_orm_active_enums, service_requests};

/// Error types for service-request operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceRequestError {
    /// Request not found.
    #[error("Service request not found: {0}")]
    NotFound(Uuid),

    /// A request already exists for this CPF.
    #[error("A request already exists for CPF {0}")]
    DuplicateCpf(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a service request from the intake form.
#[derive(Debug, Clone)]
pub struct CreateServiceRequestInput {
    /// Applicant full name.
    pub full_name: String,
    /// Applicant CPF.
    pub cpf: String,
    /// Applicant RG.
    pub rg: String,
    /// RG issuing body.
    pub rg_issuer: String,
    /// RG issuing state.
    pub rg_issuer_state: String,
    /// Applicant email.
    pub email: String,
    /// Applicant phone.
    pub phone: String,
    /// Primary activity code.
    pub primary_cnae: String,
    /// Optional secondary activity codes (comma list).
    pub secondary_cnaes: Option<String>,
    /// Business operating mode.
    pub operating_mode: OperatingMode,
    /// Declared starting capital.
    pub starting_capital: Decimal,
    /// Postal code.
    pub cep: String,
    /// City.
    pub city: String,
    /// State code.
    pub state: String,
    /// Street.
    pub street: String,
    /// Street number.
    pub number: String,
    /// District.
    pub district: String,
    /// Address complement.
    pub complement: Option<String>,
    /// Submitting account, when logged in.
    pub user_id: Option<UserId>,
    /// Amount charged for the service.
    pub service_value: Decimal,
}

/// Filter options for listing service requests.
#[derive(Debug, Clone, Default)]
pub struct ServiceRequestFilter {
    /// Filter by status.
    pub status: Option<RequestStatus>,
    /// Filter by applicant CPF.
    pub cpf: Option<String>,
}

/// Service-request repository.
#[derive(Debug, Clone)]
pub struct ServiceRequestRepository {
    db: DatabaseConnection,
}

impl ServiceRequestRepository {
    /// Creates a new service-request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a request in pending status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceRequestError::DuplicateCpf` when a request already
    /// exists for the CPF.
    pub async fn create(
        &self,
        input: CreateServiceRequestInput,
    ) -> Result<service_requests::Model, ServiceRequestError> {
        let existing = service_requests::Entity::find()
            .filter(service_requests::Column::Cpf.eq(input.cpf.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceRequestError::DuplicateCpf(input.cpf));
        }

        let now = Utc::now();
        let request = service_requests::ActiveModel {
            id: Set(Uuid::now_v7()),
            full_name: Set(input.full_name),
            cpf: Set(input.cpf),
            rg: Set(input.rg),
            rg_issuer: Set(input.rg_issuer),
            rg_issuer_state: Set(input.rg_issuer_state),
            email: Set(input.email),
            phone: Set(input.phone),
            primary_cnae: Set(input.primary_cnae),
            secondary_cnaes: Set(input.secondary_cnaes),
            operating_mode: Set(input.operating_mode.into()),
            starting_capital: Set(input.starting_capital),
            cep: Set(input.cep),
            city: Set(input.city),
            state: Set(input.state),
            street: Set(input.street),
            number: Set(input.number),
            district: Set(input.district),
            complement: Set(input.complement),
            user_id: Set(input.user_id.map(UserId::into_inner)),
            status: Set(sea_orm_active_enums::RequestStatus::Pending),
            service_value: Set(input.service_value),
            sale_created: Set(false),
            notes: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(request.insert(&self.db).await?)
    }

    /// Finds a request by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<service_requests::Model>, ServiceRequestError> {
        Ok(service_requests::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists requests, newest first.
    pub async fn list(
        &self,
        filter: ServiceRequestFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<service_requests::Model>, u64), ServiceRequestError> {
        let mut query = service_requests::Entity::find();

        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::RequestStatus = status.into();
            query = query.filter(service_requests::Column::Status.eq(status));
        }
        if let Some(cpf) = filter.cpf {
            query = query.filter(service_requests::Column::Cpf.eq(cpf));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(service_requests::Column::CreatedAt)
            .offset(Some(offset))
            .limit(Some(limit))
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Persists a new status and reports whether the transition concluded
    /// the request.
    ///
    /// Returns the updated row and, when the status moved into completed
    /// from any other state, the [`RequestCompleted`] event to feed the
    /// automation engine.
    ///
    /// # Errors
    ///
    /// Returns `ServiceRequestError::NotFound` for an unknown ID.
    pub async fn set_status(
        &self,
        id: Uuid,
        new_status: RequestStatus,
    ) -> Result<(service_requests::Model, Option<RequestCompleted>), ServiceRequestError> {
        let request = self
            .find_by_id(id)
            .await?
            .ok_or(ServiceRequestError::NotFound(id))?;

        let previous: RequestStatus = request.status.into();
        let completed_at = Utc::now();

        let mut active: service_requests::ActiveModel = request.into();
        active.status = Set(new_status.into());
        active.updated_at = Set(completed_at.into());
        let updated = active.update(&self.db).await?;

        let event = new_status.completes(previous).then(|| RequestCompleted {
            request_id: ServiceRequestId::from_uuid(updated.id),
            customer_name: updated.full_name.clone(),
            customer_email: updated.email.clone(),
            customer_phone: updated.phone.clone(),
            customer_cpf: updated.cpf.clone(),
            service_value: updated.service_value,
            user_id: updated.user_id.map(UserId::from_uuid),
            completed_at,
        });

        Ok((updated, event))
    }

    /// Updates staff notes on a request.
    pub async fn set_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> Result<service_requests::Model, ServiceRequestError> {
        let request = self
            .find_by_id(id)
            .await?
            .ok_or(ServiceRequestError::NotFound(id))?;

        let mut active: service_requests::ActiveModel = request.into();
        active.notes = Set(notes);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Marks the request as invoiced (the idempotency flag of the ledger
    /// automation).
    pub async fn mark_sale_created(&self, id: Uuid) -> Result<(), ServiceRequestError> {
        let request = self
            .find_by_id(id)
            .await?
            .ok_or(ServiceRequestError::NotFound(id))?;

        let mut active: service_requests::ActiveModel = request.into();
        active.sale_created = Set(true);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }
}
