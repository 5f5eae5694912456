//! Payment checkout and gateway webhook routes.
//!
//! Checkout creates a local payment row keyed by a unique external
//! reference, then a gateway preference for it. Status changes arrive
//! through the webhook, are translated into the canonical vocabulary, and
//! update the row by that reference.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::MaybeUser;
use centralmei_core::payments::{PaymentStatus, webhook::verify_signature};
use centralmei_core::request::{RequestStatus, ServiceKind};
use centralmei_core::validation::is_valid_email;
use centralmei_db::repositories::{
    CreatePaymentInput, PaymentRepository, ServiceRequestRepository,
};
use centralmei_shared::gateway::{
    BackUrls, CardPayer, CardPaymentRequest, PayerIdentification, PreferenceItem, PreferencePayer,
};
use centralmei_shared::types::{ServiceRequestId, UserId};

/// Default checkout amount when no service request sets the price.
const DEFAULT_CHECKOUT_AMOUNT: Decimal = Decimal::from_parts(9700, 0, 0, false, 2);

/// Creates the payment routes (all public; the webhook authenticates via
/// HMAC, checkout via optional bearer token).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/checkout", post(checkout))
        .route("/payments/{id}", get(get_payment))
        .route("/payments/{id}/card", post(card_payment))
        .route("/webhooks/mercadopago", post(webhook))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body for starting a checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    /// The MEI service being paid for.
    pub service_kind: String,
    /// Request the payment covers, when one was already submitted.
    pub service_request_id: Option<Uuid>,
    /// Buyer name (required when no request is linked).
    pub customer_name: Option<String>,
    /// Buyer email (required when no request is linked).
    pub customer_email: Option<String>,
    /// Buyer phone.
    pub customer_phone: Option<String>,
    /// Override amount for checkouts without a linked request.
    pub amount: Option<Decimal>,
}

/// Body for a direct card payment.
#[derive(Debug, Deserialize)]
pub struct CardPaymentBody {
    /// Card token from the checkout front end.
    pub token: String,
    /// Gateway payment method id.
    pub payment_method_id: String,
    /// Card issuer id.
    pub issuer_id: Option<String>,
    /// Number of installments (defaults to 1).
    pub installments: Option<u32>,
    /// Cardholder email.
    pub payer_email: Option<String>,
    /// Cardholder document type (defaults to CPF).
    pub identification_type: Option<String>,
    /// Cardholder document number.
    pub identification_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    action: Option<String>,
    #[serde(default)]
    data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookData {
    id: Option<serde_json::Value>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /payments/checkout - Create a payment and its gateway preference.
#[allow(clippy::too_many_lines)]
async fn checkout(
    State(state): State<AppState>,
    user: MaybeUser,
    Json(body): Json<CheckoutBody>,
) -> impl IntoResponse {
    let Ok(service_kind) = ServiceKind::from_str(&body.service_kind) else {
        return bad_request("Unknown service kind");
    };

    let payments = PaymentRepository::new((*state.db).clone());
    let user_id = user.0.as_ref().map(|claims| claims.user_id());

    // Buyer snapshot and amount come from the linked request when present
    let (customer_name, customer_email, customer_phone, amount, request_id) =
        match body.service_request_id {
            Some(request_id) => {
                let requests = ServiceRequestRepository::new((*state.db).clone());
                match requests.find_by_id(request_id).await {
                    Ok(Some(request)) => (
                        request.full_name,
                        request.email,
                        Some(request.phone),
                        request.service_value,
                        Some(request_id),
                    ),
                    Ok(None) => return bad_request("Service request not found"),
                    Err(e) => {
                        error!(error = %e, "Failed to load request for checkout");
                        return internal_error();
                    }
                }
            }
            None => {
                let Some(name) = body.customer_name.filter(|n| !n.trim().is_empty()) else {
                    return bad_request("customer_name is required without a service request");
                };
                let Some(email) = body.customer_email.filter(|e| is_valid_email(e)) else {
                    return bad_request("A valid customer_email is required without a service request");
                };
                let amount = body.amount.unwrap_or(DEFAULT_CHECKOUT_AMOUNT);
                if amount <= Decimal::ZERO {
                    return bad_request("Amount must be greater than zero");
                }
                (name, email, body.customer_phone, amount, None)
            }
        };

    // Re-enter an abandoned checkout instead of duplicating payments
    if let (Some(user_id), Some(request_id)) = (user_id, request_id) {
        match payments.find_pending_for_request(user_id, request_id).await {
            Ok(Some(existing)) if existing.gateway_preference_id.is_some() => {
                return (
                    StatusCode::OK,
                    Json(json!({
                        "payment": existing,
                        "preference_id": existing.gateway_preference_id,
                        "public_key": state.gateway_config.public_key,
                    })),
                )
                    .into_response();
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Failed to look up existing payment");
                return internal_error();
            }
        }
    }

    let external_reference = new_external_reference();
    let payment = match payments
        .create(CreatePaymentInput {
            user_id: user_id.map(UserId::from_uuid),
            service_request_id: request_id.map(ServiceRequestId::from_uuid),
            service_kind,
            amount,
            customer_name: customer_name.clone(),
            customer_email: customer_email.clone(),
            customer_phone,
            external_reference: external_reference.clone(),
        })
        .await
    {
        Ok(payment) => payment,
        Err(e) => {
            error!(error = %e, "Failed to create payment");
            return internal_error();
        }
    };

    let items = [PreferenceItem {
        title: format!("Central MEI - {}", service_kind.label()),
        description: None,
        quantity: 1,
        currency_id: "BRL".to_string(),
        unit_price: amount,
    }];
    let payer = PreferencePayer {
        name: customer_name,
        email: customer_email,
    };
    let base = state.gateway_config.back_url_base.trim_end_matches('/');
    let back_urls = BackUrls {
        success: format!("{base}/payments/success"),
        failure: format!("{base}/payments/failure"),
        pending: format!("{base}/payments/pending"),
    };

    let preference = match state
        .gateway
        .create_preference(&items, &payer, &back_urls, &external_reference)
        .await
    {
        Ok(preference) => preference,
        Err(e) => {
            // Technical detail stays in the log; the buyer sees a generic failure
            error!(error = %e, payment_id = %payment.id, "Gateway preference creation failed");
            return gateway_error();
        }
    };

    let payment = match payments.set_preference(payment.id, preference.id.clone()).await {
        Ok(payment) => payment,
        Err(e) => {
            error!(error = %e, "Failed to store gateway preference");
            return internal_error();
        }
    };

    info!(payment_id = %payment.id, "Checkout created");

    (
        StatusCode::CREATED,
        Json(json!({
            "payment": payment,
            "preference_id": preference.id,
            "init_point": preference.init_point,
            "public_key": state.gateway_config.public_key,
        })),
    )
        .into_response()
}

/// GET /payments/{id} - Fetch one payment (status pages poll this).
async fn get_payment(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let payments = PaymentRepository::new((*state.db).clone());

    match payments.find_by_id(id).await {
        Ok(Some(payment)) => (StatusCode::OK, Json(json!({ "payment": payment }))).into_response(),
        Ok(None) => not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to load payment");
            internal_error()
        }
    }
}

/// POST /payments/{id}/card - Charge a tokenized card directly.
async fn card_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CardPaymentBody>,
) -> impl IntoResponse {
    let payments = PaymentRepository::new((*state.db).clone());

    let payment = match payments.find_by_id(id).await {
        Ok(Some(payment)) => payment,
        Ok(None) => return not_found(id),
        Err(e) => {
            error!(error = %e, "Failed to load payment");
            return internal_error();
        }
    };

    let kind: ServiceKind = payment.service_kind.into();
    let request = CardPaymentRequest {
        transaction_amount: payment.amount,
        token: body.token,
        description: format!("Central MEI - {}", kind.label()),
        installments: body.installments.unwrap_or(1),
        payment_method_id: body.payment_method_id,
        issuer_id: body.issuer_id,
        payer: CardPayer {
            email: body.payer_email.unwrap_or_else(|| payment.customer_email.clone()),
            identification: PayerIdentification {
                doc_type: body.identification_type.unwrap_or_else(|| "CPF".to_string()),
                number: body.identification_number.unwrap_or_default(),
            },
        },
        external_reference: payment.external_reference.clone(),
    };

    let gateway_payment = match state.gateway.create_card_payment(&request).await {
        Ok(gateway_payment) => gateway_payment,
        Err(e) => {
            error!(error = %e, payment_id = %payment.id, "Card payment failed");
            return gateway_error();
        }
    };

    let Ok(status) = PaymentStatus::from_gateway(&gateway_payment.status) else {
        error!(
            status = %gateway_payment.status,
            "Gateway returned a status outside the known vocabulary"
        );
        return gateway_error();
    };

    let updated = match payments
        .apply_gateway_update(
            &payment.external_reference,
            status,
            Some(gateway_payment.id.to_string()),
            None,
        )
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            error!(error = %e, "Failed to persist card payment result");
            return internal_error();
        }
    };

    info!(payment_id = %updated.id, status = %status, "Card payment processed");

    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "gateway_payment_id": gateway_payment.id,
            "status_detail": gateway_payment.status_detail,
            "payment": updated,
        })),
    )
        .into_response()
}

/// POST /webhooks/mercadopago - Asynchronous gateway notifications.
///
/// With a webhook secret configured, the `x-signature` HMAC is mandatory;
/// a missing or mismatching signature rejects the delivery with no state
/// change. Malformed JSON is a 400. Unknown notification kinds are
/// acknowledged and ignored.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let raw_body = String::from_utf8_lossy(&body);

    let secret = &state.gateway_config.webhook_secret;
    if !secret.is_empty() {
        let signature = headers
            .get("x-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if let Err(e) = verify_signature(secret, signature, request_id, &raw_body) {
            warn!(error = %e, "Webhook rejected: invalid signature");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "invalid_signature" })),
            )
                .into_response();
        }
    }

    let Ok(notification) = serde_json::from_slice::<WebhookBody>(&body) else {
        warn!("Webhook rejected: malformed JSON");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "malformed_payload" })),
        )
            .into_response();
    };

    let is_payment_event = notification.kind.as_deref() == Some("payment")
        && matches!(
            notification.action.as_deref(),
            Some("payment.created" | "payment.updated")
        );
    if !is_payment_event {
        return (StatusCode::OK, Json(json!({ "status": "ignored" }))).into_response();
    }

    let Some(gateway_payment_id) = notification.data.id.as_ref().and_then(parse_gateway_id) else {
        warn!("Webhook rejected: missing payment id");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing_payment_id" })),
        )
            .into_response();
    };

    // The notification only carries an id; the payload of record comes from
    // the gateway itself
    let gateway_payment = match state.gateway.get_payment(gateway_payment_id).await {
        Ok(gateway_payment) => gateway_payment,
        Err(e) => {
            error!(error = %e, gateway_payment_id, "Failed to fetch payment from gateway");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "gateway_error" })),
            )
                .into_response();
        }
    };

    let Some(external_reference) = gateway_payment.external_reference.clone() else {
        warn!(gateway_payment_id, "Gateway payment carries no external reference");
        return (StatusCode::OK, Json(json!({ "status": "ignored" }))).into_response();
    };

    let Ok(status) = PaymentStatus::from_gateway(&gateway_payment.status) else {
        error!(
            status = %gateway_payment.status,
            "Gateway returned a status outside the known vocabulary"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unknown_status" })),
        )
            .into_response();
    };

    let payments = PaymentRepository::new((*state.db).clone());
    let extra = json!({
        "payment_method_id": gateway_payment.payment_method_id,
        "transaction_amount": gateway_payment.transaction_amount,
    });

    let payment = match payments
        .apply_gateway_update(
            &external_reference,
            status,
            Some(gateway_payment_id.to_string()),
            Some(extra),
        )
        .await
    {
        Ok(payment) => payment,
        Err(e) => {
            // Unknown references happen for payments created outside this
            // system; acknowledge so the gateway stops retrying
            warn!(error = %e, %external_reference, "Webhook update not applied");
            return (StatusCode::OK, Json(json!({ "status": "ignored" }))).into_response();
        }
    };

    info!(payment_id = %payment.id, status = %status, "Payment updated from webhook");

    // An approved payment moves its linked request into processing;
    // completion stays a staff decision
    if status.is_approved() {
        if let Some(request_id) = payment.service_request_id {
            promote_request(&state, request_id).await;
        }
    }

    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

async fn promote_request(state: &AppState, request_id: Uuid) {
    let requests = ServiceRequestRepository::new((*state.db).clone());

    match requests.find_by_id(request_id).await {
        Ok(Some(request)) => {
            let status: RequestStatus = request.status.into();
            if status == RequestStatus::Pending {
                if let Err(e) = requests.set_status(request_id, RequestStatus::Processing).await {
                    error!(error = %e, %request_id, "Failed to promote request after approval");
                }
            }
        }
        Ok(None) => warn!(%request_id, "Approved payment references a missing request"),
        Err(e) => error!(error = %e, %request_id, "Failed to load request after approval"),
    }
}

fn parse_gateway_id(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn new_external_reference() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("CMEI-{}", &hex[..12])
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
            "message": format!("Payment not found: {id}")
        })),
    )
        .into_response()
}

fn gateway_error() -> axum::response::Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": "gateway_error",
            "message": "Payment could not be processed. Please try again."
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

    #[test]
    fn test_external_reference_shape() {
        let reference = new_external_reference();
        assert!(reference.starts_with("CMEI-"));
        assert_eq!(reference.len(), 17);
        assert!(
            reference[5..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_parse_gateway_id_accepts_both_shapes() {
        assert_eq!(parse_gateway_id(&json!(42)), Some(42));
        assert_eq!(parse_gateway_id(&json!("42")), Some(42));
        assert_eq!(parse_gateway_id(&json!(null)), None);
        assert_eq!(parse_gateway_id(&json!("abc")), None);
    }

    #[test]
    fn test_webhook_body_parses_minimal_payload() {
        let body: WebhookBody =
            serde_json::from_str(r#"{"type":"payment","action":"payment.updated","data":{"id":"7"}}"#)
                .unwrap();
        assert_eq!(body.kind.as_deref(), Some("payment"));
        assert_eq!(parse_gateway_id(body.data.id.as_ref().unwrap()), Some(7));
    }
}
