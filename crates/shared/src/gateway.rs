//! Payment-gateway HTTP client (Mercado Pago API).
//!
//! Thin wrapper over the three remote operations the application uses:
//! checkout preferences, direct card payments, and payment lookups. The
//! gateway's status vocabulary is returned verbatim here; translation into
//! the canonical application statuses happens in the core crate.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::GatewayConfig;

/// Payment gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure reaching the gateway.
    #[error("gateway request failed: {0}")]
    Transport(String),

    /// The gateway answered with an unexpected HTTP status.
    #[error("gateway returned status {status}: {detail}")]
    UnexpectedStatus {
        /// HTTP status returned.
        status: u16,
        /// Error detail extracted from the response body, if any.
        detail: String,
    },

    /// The response body could not be decoded.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

/// One line item in a checkout preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    /// Item title shown at checkout.
    pub title: String,
    /// Item description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Quantity.
    pub quantity: u32,
    /// Currency code (always BRL here).
    pub currency_id: String,
    /// Unit price.
    pub unit_price: Decimal,
}

/// Payer identification for a preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferencePayer {
    /// Payer name.
    pub name: String,
    /// Payer email.
    pub email: String,
}

/// Redirect URLs the gateway sends the buyer back to.
#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    /// Approved-payment redirect.
    pub success: String,
    /// Failed-payment redirect.
    pub failure: String,
    /// Pending-payment redirect.
    pub pending: String,
}

#[derive(Debug, Serialize)]
struct PreferenceRequest<'a> {
    items: &'a [PreferenceItem],
    payer: &'a PreferencePayer,
    back_urls: &'a BackUrls,
    auto_return: &'a str,
    external_reference: &'a str,
}

/// Created checkout preference.
#[derive(Debug, Clone, Deserialize)]
pub struct Preference {
    /// Gateway preference ID.
    pub id: String,
    /// Hosted checkout URL.
    #[serde(default)]
    pub init_point: Option<String>,
}

/// Cardholder identification document.
#[derive(Debug, Clone, Serialize)]
pub struct PayerIdentification {
    /// Document type (CPF/CNPJ).
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Document number.
    pub number: String,
}

/// Direct card payment request.
#[derive(Debug, Clone, Serialize)]
pub struct CardPaymentRequest {
    /// Amount to charge.
    pub transaction_amount: Decimal,
    /// Card token produced by the checkout front end.
    pub token: String,
    /// Charge description.
    pub description: String,
    /// Number of installments.
    pub installments: u32,
    /// Gateway payment method id (visa, master, ...).
    pub payment_method_id: String,
    /// Card issuer id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    /// Payer email + document.
    pub payer: CardPayer,
    /// Our correlation key.
    pub external_reference: String,
}

/// Payer block of a card payment.
#[derive(Debug, Clone, Serialize)]
pub struct CardPayer {
    /// Payer email.
    pub email: String,
    /// Payer document.
    pub identification: PayerIdentification,
}

/// Payment as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    /// Gateway payment ID.
    pub id: i64,
    /// Gateway status string (untranslated).
    pub status: String,
    /// Fine-grained status detail.
    #[serde(default)]
    pub status_detail: Option<String>,
    /// Our correlation key.
    #[serde(default)]
    pub external_reference: Option<String>,
    /// Payment method used.
    #[serde(default)]
    pub payment_method_id: Option<String>,
    /// Charged amount.
    #[serde(default)]
    pub transaction_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GatewayClient {
    /// Creates a new gateway client from configuration.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    /// Creates a checkout preference.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn create_preference(
        &self,
        items: &[PreferenceItem],
        payer: &PreferencePayer,
        back_urls: &BackUrls,
        external_reference: &str,
    ) -> Result<Preference, GatewayError> {
        let body = PreferenceRequest {
            items,
            payer,
            back_urls,
            auto_return: "approved",
            external_reference,
        };

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    /// Creates a direct card payment.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn create_card_payment(
        &self,
        request: &CardPaymentRequest,
    ) -> Result<GatewayPayment, GatewayError> {
        let response = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetches a payment by its gateway ID.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport failure, non-2xx status, or an
    /// undecodable body.
    pub async fn get_payment(&self, payment_id: i64) -> Result<GatewayPayment, GatewayError> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{payment_id}", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            return serde_json::from_slice(&bytes)
                .map_err(|e| GatewayError::MalformedResponse(e.to_string()));
        }

        let detail = serde_json::from_slice::<GatewayErrorBody>(&bytes)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());

        warn!(status = status.as_u16(), %detail, "Gateway call rejected");

        Err(GatewayError::UnexpectedStatus {
            status: status.as_u16(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_preference_request_serializes_expected_shape() {
        let items = vec![PreferenceItem {
            title: "Central MEI - Abertura de MEI".to_string(),
            description: None,
            quantity: 1,
            currency_id: "BRL".to_string(),
            unit_price: dec!(97.00),
        }];
        let payer = PreferencePayer {
            name: "João Silva".to_string(),
            email: "joao@example.com".to_string(),
        };
        let back_urls = BackUrls {
            success: "https://example.com/ok".to_string(),
            failure: "https://example.com/fail".to_string(),
            pending: "https://example.com/wait".to_string(),
        };
        let request = PreferenceRequest {
            items: &items,
            payer: &payer,
            back_urls: &back_urls,
            auto_return: "approved",
            external_reference: "CMEI-ABC123",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["items"][0]["quantity"], 1);
        assert_eq!(json["external_reference"], "CMEI-ABC123");
        assert_eq!(json["auto_return"], "approved");
        assert!(json["items"][0].get("description").is_none());
    }

    #[test]
    fn test_gateway_payment_decodes_partial_body() {
        let body = r#"{"id": 123456, "status": "approved"}"#;
        let payment: GatewayPayment = serde_json::from_str(body).unwrap();
        assert_eq!(payment.id, 123_456);
        assert_eq!(payment.status, "approved");
        assert!(payment.external_reference.is_none());
    }
}
