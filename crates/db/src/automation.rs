//! Ledger automation engine.
//!
//! An explicit, synchronous event dispatcher sitting behind the
//! persistence layer: repositories return domain events from their save
//! operations and callers hand them to [`AutomationEngine::dispatch`],
//! which runs the chain inline with the triggering request:
//!
//! ```text
//! RequestCompleted -> Sale(paid) -> SalePaid -> CashMovement -> CashBalance
//! ```
//!
//! Nothing here is fatal to the caller: a failed or skipped step leaves
//! the upstream entity valid and the inconsistency logged for an operator.

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use centralmei_core::request::{RequestCompleted, SaleDecision, decide_sale_creation};
use centralmei_core::sales::{PaymentMethod, SalePaid, SaleStatus};
use centralmei_core::cashbook::MovementDirection;
use centralmei_shared::types::SaleId;

use sea_orm::DatabaseConnection;

use crate::repositories::{
    CashMovementRepository, CatalogRepository, CreateMovementInput, CreateSaleInput,
    SaleRepository, ServiceRequestRepository, UserRepository,
};

/// Errors surfaced by automation handlers.
///
/// Callers are expected to log these and carry on; the triggering save has
/// already succeeded.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// A repository operation failed.
    #[error("automation step failed: {0}")]
    Step(String),
}

/// Persistence events the engine reacts to.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A service request transitioned into completed.
    RequestCompleted(RequestCompleted),
    /// A sale was saved paid with a payment date.
    SalePaid(SalePaid),
}

/// Synchronous dispatcher for ledger automation.
#[derive(Debug, Clone)]
pub struct AutomationEngine {
    db: DatabaseConnection,
}

impl AutomationEngine {
    /// Creates a new automation engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Processes one event and everything it triggers downstream.
    ///
    /// # Errors
    ///
    /// Returns `AutomationError` when a step fails; the upstream save is
    /// unaffected either way.
    pub async fn dispatch(&self, event: DomainEvent) -> Result<(), AutomationError> {
        match event {
            DomainEvent::RequestCompleted(event) => self.handle_request_completed(event).await,
            DomainEvent::SalePaid(event) => self.handle_sale_paid(event).await,
        }
    }

    /// Request -> Sale step.
    ///
    /// Idempotent: the request's `sale_created` flag is checked first, then
    /// the unique sale back-reference in case the flag write lost a race
    /// with a concurrent save.
    async fn handle_request_completed(
        &self,
        event: RequestCompleted,
    ) -> Result<(), AutomationError> {
        let request_id = event.request_id.into_inner();
        info!(%request_id, customer = %event.customer_name, "Processing completed service request");

        let requests = ServiceRequestRepository::new(self.db.clone());
        let sales = SaleRepository::new(self.db.clone());
        let users = UserRepository::new(self.db.clone());
        let catalog = CatalogRepository::new(self.db.clone());

        let request = requests
            .find_by_id(request_id)
            .await
            .map_err(step_error)?
            .ok_or_else(|| AutomationError::Step(format!("request {request_id} disappeared")))?;

        let sale_exists = sales
            .exists_for_request(request_id)
            .await
            .map_err(step_error)?;
        let operator = users
            .find_operator(event.user_id)
            .await
            .map_err(step_error)?;

        let operator = match decide_sale_creation(request.sale_created, sale_exists, operator) {
            SaleDecision::Create(operator) => operator,
            SaleDecision::SkipFlagged => {
                warn!(%request_id, "Sale already created for request, skipping");
                return Ok(());
            }
            SaleDecision::SkipExisting => {
                warn!(%request_id, "Sale already exists for request, repairing flag");
                requests
                    .mark_sale_created(request_id)
                    .await
                    .map_err(step_error)?;
                return Ok(());
            }
            SaleDecision::SkipNoOperator => {
                error!(%request_id, "No eligible user to attribute the sale, skipping");
                return Ok(());
            }
        };

        let refs = catalog
            .ensure_service_product(event.service_value)
            .await
            .map_err(step_error)?;

        let (sale, paid_event) = sales
            .create(CreateSaleInput {
                customer_name: event.customer_name.clone(),
                customer_email: Some(event.customer_email),
                customer_phone: Some(event.customer_phone),
                customer_cpf_cnpj: Some(event.customer_cpf),
                product_id: refs.product.id,
                quantity: 1,
                unit_price: event.service_value,
                discount: Decimal::ZERO,
                status: SaleStatus::Paid,
                payment_method: Some(PaymentMethod::Pix),
                notes: Some(format!(
                    "Venda gerada automaticamente pela conclusão da solicitação {} - {}",
                    request_id, event.customer_name
                )),
                created_by: operator,
                service_request_id: Some(event.request_id),
                payment_date: Some(event.completed_at),
            })
            .await
            .map_err(step_error)?;

        requests
            .mark_sale_created(request_id)
            .await
            .map_err(step_error)?;

        info!(sale_id = %sale.id, %request_id, "Sale created for completed request");

        if let Some(paid_event) = paid_event {
            self.handle_sale_paid(paid_event).await?;
        }

        Ok(())
    }

    /// Sale -> CashMovement step, plus the balance recompute the movement
    /// repository performs on insert.
    ///
    /// Idempotent: skipped when a movement already references the sale.
    async fn handle_sale_paid(&self, event: SalePaid) -> Result<(), AutomationError> {
        let sale_id = event.sale_id.into_inner();

        let movements = CashMovementRepository::new(self.db.clone());
        let catalog = CatalogRepository::new(self.db.clone());
        let sales = SaleRepository::new(self.db.clone());

        if movements
            .exists_for_sale(sale_id)
            .await
            .map_err(step_error)?
        {
            warn!(%sale_id, "Cash movement already exists for sale, skipping");
            return Ok(());
        }

        let sale = sales
            .find_by_id(sale_id)
            .await
            .map_err(step_error)?
            .ok_or_else(|| AutomationError::Step(format!("sale {sale_id} disappeared")))?;

        let product = catalog
            .find_product(event.product_id.into_inner())
            .await
            .map_err(step_error)?
            .ok_or_else(|| {
                AutomationError::Step(format!("product {} disappeared", event.product_id))
            })?;

        let classification = catalog
            .find_subcategory_with_category(product.subcategory_id)
            .await
            .map_err(step_error)?;
        let (subcategory_id, category_id) = classification
            .map(|(subcategory, category)| (Some(subcategory.id), Some(category.id)))
            .unwrap_or_default();

        let movement = movements
            .create(CreateMovementInput {
                direction: MovementDirection::In,
                category_id,
                subcategory_id,
                description: format!(
                    "Venda {} - {} - {}",
                    short_ref(event.sale_id),
                    product.name,
                    sale.customer_name
                ),
                amount: event.final_value,
                sale_id: Some(event.sale_id),
                movement_date: event.payment_date.date_naive(),
                created_by: event.created_by,
                notes: Some(format!(
                    "Movimentação automática - venda para {}",
                    sale.customer_name
                )),
            })
            .await
            .map_err(step_error)?;

        info!(movement_id = %movement.id, %sale_id, "Cash movement created for paid sale");
        Ok(())
    }
}

fn step_error<E: std::fmt::Display>(error: E) -> AutomationError {
    AutomationError::Step(error.to_string())
}

/// Short human-readable reference for a sale in movement descriptions.
fn short_ref(sale_id: SaleId) -> String {
    let full = sale_id.to_string();
    format!("#{}", &full[..8])
}
