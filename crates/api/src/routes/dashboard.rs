//! Back-office dashboard summary route.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::AppState;
use centralmei_db::repositories::ReportRepository;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/summary", get(summary))
}

/// GET /dashboard/summary - Month-to-date sales and cash-book numbers.
async fn summary(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());

    match repo.dashboard_summary(Utc::now().date_naive()).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "month_sales_total": summary.month_sales_total,
                "month_sales_count": summary.month_sales_count,
                "month_total_in": summary.month_total_in,
                "month_total_out": summary.month_total_out,
                "month_balance": summary.month_total_in - summary.month_total_out,
                "latest_balance": summary.latest_balance,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to build dashboard summary");
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
