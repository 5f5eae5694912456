//! Sale repository.
//!
//! Derived amounts are recomputed on every save, and any save that lands a
//! sale in paid state with a payment date yields a [`SalePaid`] event for
//! the automation engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use centralmei_core::sales::{
    PaymentMethod, SaleAmounts, SaleError, SalePaid, SaleStatus, triggers_cash_movement,
};
use centralmei_shared::types::{ProductId, SaleId, ServiceRequestId, UserId};

use crate::entities::{sales, sea_orm_active_enums};

/// Error types for sale operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleRepoError {
    /// Sale not found.
    #[error("Sale not found: {0}")]
    NotFound(Uuid),

    /// Amount arithmetic rejected the input.
    #[error(transparent)]
    Amounts(#[from] SaleError),

    /// The request already has a sale (unique back-reference violated).
    #[error("Service request {0} already has a sale")]
    RequestAlreadyInvoiced(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// Buyer name.
    pub customer_name: String,
    /// Buyer email.
    pub customer_email: Option<String>,
    /// Buyer phone.
    pub customer_phone: Option<String>,
    /// Buyer CPF/CNPJ.
    pub customer_cpf_cnpj: Option<String>,
    /// Product sold.
    pub product_id: Uuid,
    /// Quantity (>= 1).
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
    /// Discount applied to the total.
    pub discount: Decimal,
    /// Settlement status.
    pub status: SaleStatus,
    /// Settlement method.
    pub payment_method: Option<PaymentMethod>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Owning staff user.
    pub created_by: UserId,
    /// Originating request for automated sales.
    pub service_request_id: Option<ServiceRequestId>,
    /// Settlement timestamp; required for paid sales to enter the cash book.
    pub payment_date: Option<DateTime<Utc>>,
}

/// Filter options for listing sales.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    /// Filter by status.
    pub status: Option<SaleStatus>,
    /// Filter by product.
    pub product_id: Option<Uuid>,
    /// Sales made on or after this instant.
    pub sold_from: Option<DateTime<Utc>>,
    /// Sales made on or before this instant.
    pub sold_to: Option<DateTime<Utc>>,
}

/// Sale repository.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a sale with freshly computed amounts.
    ///
    /// Returns the row and, when it was saved paid with a payment date,
    /// the [`SalePaid`] event to feed the automation engine.
    ///
    /// # Errors
    ///
    /// Returns `SaleRepoError::Amounts` for invalid quantity/price/discount
    /// combinations and `SaleRepoError::RequestAlreadyInvoiced` when the
    /// back-referenced request already has a sale.
    pub async fn create(
        &self,
        input: CreateSaleInput,
    ) -> Result<(sales::Model, Option<SalePaid>), SaleRepoError> {
        let amounts = SaleAmounts::compute(input.quantity, input.unit_price, input.discount)?;

        if let Some(request_id) = input.service_request_id {
            if self.exists_for_request(request_id.into_inner()).await? {
                return Err(SaleRepoError::RequestAlreadyInvoiced(
                    request_id.into_inner(),
                ));
            }
        }

        let now = Utc::now();
        #[allow(clippy::cast_possible_wrap)]
        let sale = sales::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_name: Set(input.customer_name),
            customer_email: Set(input.customer_email),
            customer_phone: Set(input.customer_phone),
            customer_cpf_cnpj: Set(input.customer_cpf_cnpj),
            product_id: Set(input.product_id),
            quantity: Set(input.quantity as i32),
            unit_price: Set(input.unit_price),
            total_value: Set(amounts.total_value),
            discount: Set(input.discount),
            final_value: Set(amounts.final_value),
            status: Set(input.status.into()),
            payment_method: Set(input.payment_method.map(Into::into)),
            notes: Set(input.notes),
            created_by: Set(input.created_by.into_inner()),
            service_request_id: Set(input.service_request_id.map(ServiceRequestId::into_inner)),
            sold_at: Set(now.into()),
            payment_date: Set(input.payment_date.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = sale.insert(&self.db).await?;
        let event = Self::paid_event(&model);
        Ok((model, event))
    }

    /// Finds a sale by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<sales::Model>, SaleRepoError> {
        Ok(sales::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Returns true when a sale already references the given request.
    pub async fn exists_for_request(&self, request_id: Uuid) -> Result<bool, SaleRepoError> {
        let count = sales::Entity::find()
            .filter(sales::Column::ServiceRequestId.eq(request_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Lists sales, newest first.
    pub async fn list(
        &self,
        filter: SaleFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<sales::Model>, u64), SaleRepoError> {
        let mut query = sales::Entity::find();

        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::SaleStatus = status.into();
            query = query.filter(sales::Column::Status.eq(status));
        }
        if let Some(product_id) = filter.product_id {
            query = query.filter(sales::Column::ProductId.eq(product_id));
        }
        if let Some(from) = filter.sold_from {
            query = query.filter(sales::Column::SoldAt.gte(from));
        }
        if let Some(to) = filter.sold_to {
            query = query.filter(sales::Column::SoldAt.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(sales::Column::SoldAt)
            .offset(Some(offset))
            .limit(Some(limit))
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Marks a pending sale as paid.
    ///
    /// Returns the updated row and the [`SalePaid`] event.
    ///
    /// # Errors
    ///
    /// Returns `SaleRepoError::NotFound` for an unknown ID.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
    ) -> Result<(sales::Model, Option<SalePaid>), SaleRepoError> {
        let sale = self
            .find_by_id(id)
            .await?
            .ok_or(SaleRepoError::NotFound(id))?;

        let mut active: sales::ActiveModel = sale.into();
        active.status = Set(sea_orm_active_enums::SaleStatus::Paid);
        active.payment_method = Set(Some(method.into()));
        active.payment_date = Set(Some(payment_date.into()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;

        let event = Self::paid_event(&updated);
        Ok((updated, event))
    }

    fn paid_event(model: &sales::Model) -> Option<SalePaid> {
        let status: SaleStatus = model.status.into();
        let payment_date = model.payment_date.map(DateTime::<Utc>::from);

        triggers_cash_movement(status, payment_date).then(|| SalePaid {
            sale_id: SaleId::from_uuid(model.id),
            product_id: ProductId::from_uuid(model.product_id),
            final_value: model.final_value,
            payment_date: payment_date.unwrap_or_else(Utc::now),
            created_by: UserId::from_uuid(model.created_by),
            service_request_id: model.service_request_id.map(ServiceRequestId::from_uuid),
        })
    }
}
