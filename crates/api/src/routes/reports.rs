//! Financial report routes for the staff back office.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use centralmei_core::cashbook::MovementDirection;
use centralmei_core::cashbook::report::{MovementSort, ReportPeriod};
use centralmei_db::repositories::{MovementReportFilter, ReportRepository};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/movements", get(movement_report))
}

/// Query parameters for the movement report.
#[derive(Debug, Deserialize)]
pub struct MovementReportQuery {
    /// Filter by direction.
    pub direction: Option<String>,
    /// Filter by category.
    pub category: Option<Uuid>,
    /// Filter by subcategory.
    pub subcategory: Option<Uuid>,
    /// Named period (today, yesterday, this_week, ...).
    pub period: Option<String>,
    /// Explicit range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Explicit range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Sort order.
    pub sort: Option<String>,
}

/// GET /reports/movements - Filtered movements plus aggregate totals.
async fn movement_report(
    State(state): State<AppState>,
    Query(query): Query<MovementReportQuery>,
) -> impl IntoResponse {
    let direction = match query.direction.as_deref().map(MovementDirection::from_str) {
        Some(Ok(direction)) => Some(direction),
        Some(Err(_)) => return bad_request("Unknown movement direction"),
        None => None,
    };
    let period = match query.period.as_deref().map(ReportPeriod::from_str) {
        Some(Ok(period)) => Some(period),
        Some(Err(_)) => return bad_request("Unknown report period"),
        None => None,
    };
    let sort = match query.sort.as_deref().map(MovementSort::from_str) {
        Some(Ok(sort)) => sort,
        Some(Err(_)) => return bad_request("Unknown sort order"),
        None => MovementSort::default(),
    };

    let filter = MovementReportFilter {
        direction,
        category_id: query.category,
        subcategory_id: query.subcategory,
        period,
        date_from: query.from,
        date_to: query.to,
        sort,
    };

    let anchor = Utc::now().date_naive();
    let (start, end) = filter.resolve_range(anchor);

    let repo = ReportRepository::new((*state.db).clone());
    match repo.movement_report(&filter, anchor).await {
        Ok((rows, summary)) => (
            StatusCode::OK,
            Json(json!({
                "movements": rows,
                "summary": summary,
                "range": { "start": start, "end": end },
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to run movement report");
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
