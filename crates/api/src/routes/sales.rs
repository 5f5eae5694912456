//! Sale routes for the staff back office.
//!
//! A sale created or marked paid here flows through the same automation
//! engine as the request-completion path, so the cash book stays
//! consistent whichever door a sale comes in through.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use centralmei_core::sales::{PaymentMethod, SaleStatus};
use centralmei_db::repositories::{CreateSaleInput, SaleFilter, SaleRepoError, SaleRepository};
use centralmei_db::{AutomationEngine, DomainEvent};
use centralmei_shared::types::{PageRequest, UserId};

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales))
        .route("/sales", post(create_sale))
        .route("/sales/{id}", get(get_sale))
        .route("/sales/{id}/pay", post(pay_sale))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing sales.
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by product.
    pub product: Option<Uuid>,
    /// Sold on or after.
    pub from: Option<DateTime<Utc>>,
    /// Sold on or before.
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Body for creating a sale.
#[derive(Debug, Deserialize)]
pub struct CreateSaleBody {
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
    /// Quantity.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
    /// Discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Settlement status (defaults to pending).
    pub status: Option<String>,
    /// Settlement method.
    pub payment_method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Body for marking a sale as paid.
#[derive(Debug, Deserialize)]
pub struct PaySaleBody {
    /// Settlement method.
    pub payment_method: String,
    /// Settlement instant; defaults to now.
    pub payment_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /sales - List sales with filters.
async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListSalesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(SaleStatus::from_str) {
        Some(Ok(status)) => Some(status),
        Some(Err(_)) => return bad_request("Unknown sale status"),
        None => None,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    let repo = SaleRepository::new((*state.db).clone());
    let filter = SaleFilter {
        status,
        product_id: query.product,
        sold_from: query.from,
        sold_to: query.to,
    };

    match repo.list(filter, page.offset(), page.limit()).await {
        Ok((rows, total)) => (
            StatusCode::OK,
            Json(json!({
                "sales": rows,
                "total": total,
                "page": page.page,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list sales");
            internal_error()
        }
    }
}

/// POST /sales - Record a manual sale.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateSaleBody>,
) -> impl IntoResponse {
    let status = match body.status.as_deref().map(SaleStatus::from_str) {
        Some(Ok(status)) => status,
        Some(Err(_)) => return bad_request("Unknown sale status"),
        None => SaleStatus::Pending,
    };
    let payment_method = match body.payment_method.as_deref().map(PaymentMethod::from_str) {
        Some(Ok(method)) => Some(method),
        Some(Err(_)) => return bad_request("Unknown payment method"),
        None => None,
    };

    // A sale recorded directly as paid settles now
    let payment_date = (status == SaleStatus::Paid).then(Utc::now);

    let repo = SaleRepository::new((*state.db).clone());
    let result = repo
        .create(CreateSaleInput {
            customer_name: body.customer_name,
            customer_email: body.customer_email,
            customer_phone: body.customer_phone,
            customer_cpf_cnpj: body.customer_cpf_cnpj,
            product_id: body.product_id,
            quantity: body.quantity,
            unit_price: body.unit_price,
            discount: body.discount,
            status,
            payment_method,
            notes: body.notes,
            created_by: UserId::from_uuid(auth.user_id()),
            service_request_id: None,
            payment_date,
        })
        .await;

    match result {
        Ok((sale, event)) => {
            info!(sale_id = %sale.id, "Sale recorded");
            dispatch_paid_event(&state, event).await;
            (StatusCode::CREATED, Json(json!({ "sale": sale }))).into_response()
        }
        Err(SaleRepoError::Amounts(e)) => bad_request(&e.to_string()),
        Err(e) => {
            error!(error = %e, "Failed to create sale");
            internal_error()
        }
    }
}

/// GET /sales/{id} - Fetch one sale.
async fn get_sale(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = SaleRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(Some(sale)) => (StatusCode::OK, Json(json!({ "sale": sale }))).into_response(),
        Ok(None) => not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to load sale");
            internal_error()
        }
    }
}

/// POST /sales/{id}/pay - Settle a pending sale.
async fn pay_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PaySaleBody>,
) -> impl IntoResponse {
    let Ok(method) = PaymentMethod::from_str(&body.payment_method) else {
        return bad_request("Unknown payment method");
    };
    let payment_date = body.payment_date.unwrap_or_else(Utc::now);

    let repo = SaleRepository::new((*state.db).clone());
    match repo.mark_paid(id, method, payment_date).await {
        Ok((sale, event)) => {
            info!(sale_id = %sale.id, "Sale marked paid");
            dispatch_paid_event(&state, event).await;
            (StatusCode::OK, Json(json!({ "sale": sale }))).into_response()
        }
        Err(SaleRepoError::NotFound(_)) => not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to mark sale paid");
            internal_error()
        }
    }
}

async fn dispatch_paid_event(state: &AppState, event: Option<centralmei_core::sales::SalePaid>) {
    if let Some(event) = event {
        let engine = AutomationEngine::new((*state.db).clone());
        if let Err(e) = engine.dispatch(DomainEvent::SalePaid(event)).await {
            error!(error = %e, "Cash movement automation failed");
        }
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": message
        })),
    )
        .into_response()
}

fn not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Sale not found: {id}")
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
