//! Daily cash-balance routes for the staff back office.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::AppState;
use centralmei_db::repositories::CashBalanceRepository;

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balances", get(list_balances))
        .route("/balances/latest", get(latest_balance))
}

/// Query parameters for listing balances.
#[derive(Debug, Deserialize)]
pub struct ListBalancesQuery {
    /// Range start (YYYY-MM-DD).
    pub from: NaiveDate,
    /// Range end (YYYY-MM-DD).
    pub to: NaiveDate,
}

/// GET /balances - Daily balance rows inside a date range.
async fn list_balances(
    State(state): State<AppState>,
    Query(query): Query<ListBalancesQuery>,
) -> impl IntoResponse {
    if query.from > query.to {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Range start must not be after range end"
            })),
        )
            .into_response();
    }

    let repo = CashBalanceRepository::new((*state.db).clone());
    match repo.list_range(query.from, query.to).await {
        Ok(rows) => (StatusCode::OK, Json(json!({ "balances": rows }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list balances");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET /balances/latest - The most recent daily balance row.
async fn latest_balance(State(state): State<AppState>) -> impl IntoResponse {
    let repo = CashBalanceRepository::new((*state.db).clone());
    match repo.latest().await {
        Ok(row) => (StatusCode::OK, Json(json!({ "balance": row }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load latest balance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
