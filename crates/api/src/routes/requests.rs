//! Service-request routes: public intake plus the staff back office.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::MaybeUser;
use centralmei_core::request::{OperatingMode, RequestStatus};
use centralmei_core::validation::{
    is_valid_cep, is_valid_cnae, is_valid_cpf, is_valid_email, is_valid_state,
};
use centralmei_db::repositories::{
    CreateServiceRequestInput, ServiceRequestError, ServiceRequestFilter, ServiceRequestRepository,
};
use centralmei_db::{AutomationEngine, DomainEvent};
use centralmei_shared::types::{PageRequest, UserId};

/// Default amount charged for the MEI opening service.
const DEFAULT_SERVICE_VALUE: Decimal = Decimal::from_parts(9700, 0, 0, false, 2);

/// Public intake routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/requests", post(submit_request))
}

/// Staff back-office routes.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/status", patch(set_status))
        .route("/requests/{id}/notes", patch(set_notes))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Intake form payload.
#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
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
    pub operating_mode: String,
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
}

/// Query parameters for listing requests.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by applicant CPF.
    pub cpf: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Body for the status patch.
#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
    /// Target status.
    pub status: String,
}

/// Body for the notes patch.
#[derive(Debug, Deserialize)]
pub struct SetNotesBody {
    /// New staff notes (null clears them).
    pub notes: Option<String>,
}

fn validate_intake(body: &SubmitRequestBody) -> BTreeMap<&'static str, String> {
    let mut errors = BTreeMap::new();

    if body.full_name.trim().is_empty() {
        errors.insert("full_name", "Full name is required".to_string());
    }
    if !is_valid_cpf(&body.cpf) {
        errors.insert("cpf", "Invalid CPF".to_string());
    }
    if body.rg.trim().is_empty() {
        errors.insert("rg", "RG is required".to_string());
    }
    if body.rg_issuer.trim().is_empty() {
        errors.insert("rg_issuer", "RG issuing body is required".to_string());
    }
    if !is_valid_state(&body.rg_issuer_state) {
        errors.insert("rg_issuer_state", "Invalid state code".to_string());
    }
    if !is_valid_email(&body.email) {
        errors.insert("email", "Invalid email address".to_string());
    }
    if body.phone.trim().is_empty() {
        errors.insert("phone", "Phone is required".to_string());
    }
    if !is_valid_cnae(&body.primary_cnae) {
        errors.insert("primary_cnae", "Invalid CNAE code".to_string());
    }
    if OperatingMode::from_str(&body.operating_mode).is_err() {
        errors.insert("operating_mode", "Invalid operating mode".to_string());
    }
    if body.starting_capital.is_sign_negative() {
        errors.insert(
            "starting_capital",
            "Starting capital must not be negative".to_string(),
        );
    }
    if !is_valid_cep(&body.cep) {
        errors.insert("cep", "Invalid CEP".to_string());
    }
    if body.city.trim().is_empty() {
        errors.insert("city", "City is required".to_string());
    }
    if !is_valid_state(&body.state) {
        errors.insert("state", "Invalid state code".to_string());
    }
    if body.street.trim().is_empty() {
        errors.insert("street", "Street is required".to_string());
    }
    if body.number.trim().is_empty() {
        errors.insert("number", "Number is required".to_string());
    }
    if body.district.trim().is_empty() {
        errors.insert("district", "District is required".to_string());
    }

    errors
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /requests - Submit an MEI registration request.
async fn submit_request(
    State(state): State<AppState>,
    user: MaybeUser,
    Json(body): Json<SubmitRequestBody>,
) -> impl IntoResponse {
    let errors = validate_intake(&body);
    if !errors.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "fields": errors,
            })),
        )
            .into_response();
    }

    // Checked by validate_intake
    let Ok(operating_mode) = OperatingMode::from_str(&body.operating_mode) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "fields": { "operating_mode": "Invalid operating mode" },
            })),
        )
            .into_response();
    };

    let repo = ServiceRequestRepository::new((*state.db).clone());
    let input = CreateServiceRequestInput {
        full_name: body.full_name,
        cpf: body.cpf,
        rg: body.rg,
        rg_issuer: body.rg_issuer,
        rg_issuer_state: body.rg_issuer_state,
        email: body.email,
        phone: body.phone,
        primary_cnae: body.primary_cnae,
        secondary_cnaes: body.secondary_cnaes,
        operating_mode,
        starting_capital: body.starting_capital,
        cep: body.cep,
        city: body.city,
        state: body.state,
        street: body.street,
        number: body.number,
        district: body.district,
        complement: body.complement,
        user_id: user.0.map(|claims| UserId::from_uuid(claims.user_id())),
        service_value: DEFAULT_SERVICE_VALUE,
    };

    match repo.create(input).await {
        Ok(request) => {
            info!(request_id = %request.id, "Service request submitted");
            (StatusCode::CREATED, Json(json!({ "request": request }))).into_response()
        }
        Err(ServiceRequestError::DuplicateCpf(cpf)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_cpf",
                "message": format!("A request already exists for CPF {cpf}")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create service request");
            internal_error()
        }
    }
}

/// GET /requests - List requests with filters.
async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(RequestStatus::from_str) {
        Some(Ok(status)) => Some(status),
        Some(Err(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": "Unknown request status"
                })),
            )
                .into_response();
        }
        None => None,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    let repo = ServiceRequestRepository::new((*state.db).clone());
    let filter = ServiceRequestFilter {
        status,
        cpf: query.cpf,
    };

    match repo.list(filter, page.offset(), page.limit()).await {
        Ok((rows, total)) => (
            StatusCode::OK,
            Json(json!({
                "requests": rows,
                "total": total,
                "page": page.page,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list service requests");
            internal_error()
        }
    }
}

/// GET /requests/{id} - Fetch one request.
async fn get_request(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ServiceRequestRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(Some(request)) => (StatusCode::OK, Json(json!({ "request": request }))).into_response(),
        Ok(None) => not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to load service request");
            internal_error()
        }
    }
}

/// PATCH /requests/{id}/status - Move a request through its lifecycle.
///
/// Completing a request fires the ledger automation inline; automation
/// failures are logged and never fail the status change itself.
async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStatusBody>,
) -> impl IntoResponse {
    let Ok(new_status) = RequestStatus::from_str(&body.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Unknown request status"
            })),
        )
            .into_response();
    };

    let repo = ServiceRequestRepository::new((*state.db).clone());
    let (request, event) = match repo.set_status(id, new_status).await {
        Ok(result) => result,
        Err(ServiceRequestError::NotFound(_)) => return not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to update request status");
            return internal_error();
        }
    };

    if let Some(event) = event {
        let engine = AutomationEngine::new((*state.db).clone());
        if let Err(e) = engine.dispatch(DomainEvent::RequestCompleted(event)).await {
            // Recoverable inconsistency: the request stays completed and an
            // operator reconciles the ledger manually.
            error!(request_id = %id, error = %e, "Ledger automation failed");
        }
    }

    (StatusCode::OK, Json(json!({ "request": request }))).into_response()
}

/// PATCH /requests/{id}/notes - Update staff notes.
async fn set_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SetNotesBody>,
) -> impl IntoResponse {
    let repo = ServiceRequestRepository::new((*state.db).clone());

    match repo.set_notes(id, body.notes).await {
        Ok(request) => (StatusCode::OK, Json(json!({ "request": request }))).into_response(),
        Err(ServiceRequestError::NotFound(_)) => not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to update request notes");
            internal_error()
        }
    }
}

fn not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Service request not found: {id}")
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_body() -> SubmitRequestBody {
        SubmitRequestBody {
            full_name: "João Silva".to_string(),
            cpf: "529.982.247-25".to_string(),
            rg: "12345678".to_string(),
            rg_issuer: "SSP".to_string(),
            rg_issuer_state: "SP".to_string(),
            email: "joao@example.com".to_string(),
            phone: "(11) 99999-9999".to_string(),
            primary_cnae: "5611-2/01".to_string(),
            secondary_cnaes: None,
            operating_mode: "fixed".to_string(),
            starting_capital: dec!(1000.00),
            cep: "01234-567".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            street: "Rua Exemplo".to_string(),
            number: "123".to_string(),
            district: "Centro".to_string(),
            complement: None,
        }
    }

    #[test]
    fn test_valid_intake_passes() {
        assert!(validate_intake(&valid_body()).is_empty());
    }

    #[test]
    fn test_bad_cpf_flagged() {
        let mut body = valid_body();
        body.cpf = "111.111.111-11".to_string();
        let errors = validate_intake(&body);
        assert!(errors.contains_key("cpf"));
    }

    #[test]
    fn test_multiple_errors_reported_per_field() {
        let mut body = valid_body();
        body.cep = "12".to_string();
        body.state = "ZZ".to_string();
        body.email = "not-an-email".to_string();
        let errors = validate_intake(&body);
        assert!(errors.contains_key("cep"));
        assert!(errors.contains_key("state"));
        assert!(errors.contains_key("email"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_default_service_value() {
        assert_eq!(DEFAULT_SERVICE_VALUE, dec!(97.00));
    }
}
