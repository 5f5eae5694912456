//! Cash-movement routes for the staff back office.
//!
//! The repository recomputes the affected daily balances on every write,
//! so the rows these handlers return are always consistent with
//! `/balances`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use centralmei_core::cashbook::MovementDirection;
use centralmei_db::repositories::{
    CashMovementRepository, CreateMovementInput, MovementError, MovementFilter,
    UpdateMovementInput,
};
use centralmei_shared::types::{PageRequest, UserId};

/// Creates the cash-movement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movements", get(list_movements))
        .route("/movements", post(create_movement))
        .route("/movements/{id}", patch(update_movement))
        .route("/movements/{id}", delete(delete_movement))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing movements.
#[derive(Debug, Deserialize)]
pub struct ListMovementsQuery {
    /// Filter by direction.
    pub direction: Option<String>,
    /// Filter by category.
    pub category: Option<Uuid>,
    /// Filter by subcategory.
    pub subcategory: Option<Uuid>,
    /// Dated on or after (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Dated on or before (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Body for creating a movement.
#[derive(Debug, Deserialize)]
pub struct CreateMovementBody {
    /// Money in or out.
    pub direction: String,
    /// Classifying category.
    pub category_id: Option<Uuid>,
    /// Classifying subcategory.
    pub subcategory_id: Option<Uuid>,
    /// What the movement was for.
    pub description: String,
    /// Amount (> 0).
    pub amount: Decimal,
    /// Calendar date (YYYY-MM-DD).
    pub movement_date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Body for updating a movement. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateMovementBody {
    /// New direction.
    pub direction: Option<String>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New subcategory.
    pub subcategory_id: Option<Uuid>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub movement_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /movements - List movements with filters.
async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<ListMovementsQuery>,
) -> impl IntoResponse {
    let direction = match query.direction.as_deref().map(MovementDirection::from_str) {
        Some(Ok(direction)) => Some(direction),
        Some(Err(_)) => return bad_request("Unknown movement direction"),
        None => None,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(25).min(100),
    };

    let repo = CashMovementRepository::new((*state.db).clone());
    let filter = MovementFilter {
        direction,
        category_id: query.category,
        subcategory_id: query.subcategory,
        date_from: query.from,
        date_to: query.to,
    };

    match repo.list(filter, page.offset(), page.limit()).await {
        Ok((rows, total)) => (
            StatusCode::OK,
            Json(json!({
                "movements": rows,
                "total": total,
                "page": page.page,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list movements");
            internal_error()
        }
    }
}

/// POST /movements - Record a manual movement.
async fn create_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateMovementBody>,
) -> impl IntoResponse {
    let Ok(direction) = MovementDirection::from_str(&body.direction) else {
        return bad_request("Unknown movement direction");
    };

    let repo = CashMovementRepository::new((*state.db).clone());
    let result = repo
        .create(CreateMovementInput {
            direction,
            category_id: body.category_id,
            subcategory_id: body.subcategory_id,
            description: body.description,
            amount: body.amount,
            sale_id: None,
            movement_date: body.movement_date,
            created_by: UserId::from_uuid(auth.user_id()),
            notes: body.notes,
        })
        .await;

    match result {
        Ok(movement) => {
            info!(movement_id = %movement.id, "Cash movement recorded");
            (StatusCode::CREATED, Json(json!({ "movement": movement }))).into_response()
        }
        Err(MovementError::Invalid(e)) => bad_request(&e.to_string()),
        Err(e) => {
            error!(error = %e, "Failed to create movement");
            internal_error()
        }
    }
}

/// PATCH /movements/{id} - Edit a movement.
async fn update_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMovementBody>,
) -> impl IntoResponse {
    let direction = match body.direction.as_deref().map(MovementDirection::from_str) {
        Some(Ok(direction)) => Some(direction),
        Some(Err(_)) => return bad_request("Unknown movement direction"),
        None => None,
    };

    let repo = CashMovementRepository::new((*state.db).clone());
    let result = repo
        .update(
            id,
            UpdateMovementInput {
                direction,
                category_id: body.category_id.map(Some),
                subcategory_id: body.subcategory_id.map(Some),
                description: body.description,
                amount: body.amount,
                movement_date: body.movement_date,
                notes: body.notes.map(Some),
            },
        )
        .await;

    match result {
        Ok(movement) => (StatusCode::OK, Json(json!({ "movement": movement }))).into_response(),
        Err(MovementError::NotFound(_)) => not_found(id),
        Err(MovementError::Invalid(e)) => bad_request(&e.to_string()),
        Err(e) => {
            error!(error = %e, "Failed to update movement");
            internal_error()
        }
    }
}

/// DELETE /movements/{id} - Remove a movement.
async fn delete_movement(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = CashMovementRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(MovementError::NotFound(_)) => not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to delete movement");
            internal_error()
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
            "message": format!("Cash movement not found: {id}")
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
