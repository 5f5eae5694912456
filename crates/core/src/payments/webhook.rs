//! Webhook signature verification.
//!
//! The gateway signs each notification with a header of the form
//! `ts=<unix>,v1=<hex>`, where `v1` is the HMAC-SHA256 of
//! `id:<raw body>;request-id:<request-id header>;ts:<ts>;` keyed by the
//! shared webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors raised by webhook verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The signature header is absent or not in `ts=..,v1=..` form.
    #[error("malformed signature header")]
    MalformedSignature,

    /// The computed HMAC did not match the presented one.
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Parsed `x-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the signer included.
    pub ts: String,
    /// Hex-encoded HMAC digest.
    pub v1: String,
}

impl SignatureHeader {
    /// Parses a `ts=<unix>,v1=<hex>` header value.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MalformedSignature` when either part is
    /// missing.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut ts = None;
        let mut v1 = None;

        for part in header.split(',') {
            if let Some((key, value)) = part.trim().split_once('=') {
                match key {
                    "ts" => ts = Some(value.to_string()),
                    "v1" => v1 = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        match (ts, v1) {
            (Some(ts), Some(v1)) if !ts.is_empty() && !v1.is_empty() => Ok(Self { ts, v1 }),
            _ => Err(WebhookError::MalformedSignature),
        }
    }
}

/// Verifies a webhook notification signature.
///
/// # Errors
///
/// Returns `WebhookError::MalformedSignature` for an unparsable header or
/// non-hex digest, `WebhookError::SignatureMismatch` when the HMAC does not
/// match.
pub fn verify_signature(
    secret: &str,
    signature_header: &str,
    request_id: &str,
    raw_body: &str,
) -> Result<(), WebhookError> {
    let signature = SignatureHeader::parse(signature_header)?;
    let expected = decode_hex(&signature.v1).ok_or(WebhookError::MalformedSignature)?;

    let payload = format!("id:{raw_body};request-id:{request_id};ts:{};", signature.ts);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::MalformedSignature)?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::SignatureMismatch)
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "webhook-test-secret";
    const REQUEST_ID: &str = "req-abc-123";
    const BODY: &str = r#"{"type":"payment","data":{"id":"42"}}"#;

    fn sign(secret: &str, ts: &str, request_id: &str, body: &str) -> String {
        let payload = format!("id:{body};request-id:{request_id};ts:{ts};");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let digest = sign(SECRET, "1700000000", REQUEST_ID, BODY);
        let header = format!("ts=1700000000,v1={digest}");

        assert!(verify_signature(SECRET, &header, REQUEST_ID, BODY).is_ok());
    }

    #[test]
    fn test_header_with_spaces_accepted() {
        let digest = sign(SECRET, "1700000000", REQUEST_ID, BODY);
        let header = format!("ts=1700000000, v1={digest}");

        assert!(verify_signature(SECRET, &header, REQUEST_ID, BODY).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let digest = sign("other-secret", "1700000000", REQUEST_ID, BODY);
        let header = format!("ts=1700000000,v1={digest}");

        assert_eq!(
            verify_signature(SECRET, &header, REQUEST_ID, BODY),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_tampered_body_rejected() {
        let digest = sign(SECRET, "1700000000", REQUEST_ID, BODY);
        let header = format!("ts=1700000000,v1={digest}");

        assert_eq!(
            verify_signature(SECRET, &header, REQUEST_ID, r#"{"type":"payment"}"#),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_tampered_timestamp_rejected() {
        let digest = sign(SECRET, "1700000000", REQUEST_ID, BODY);
        let header = format!("ts=1700009999,v1={digest}");

        assert_eq!(
            verify_signature(SECRET, &header, REQUEST_ID, BODY),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn test_malformed_header_rejected() {
        for header in ["", "ts=123", "v1=abcd", "garbage", "ts=,v1="] {
            assert_eq!(
                verify_signature(SECRET, header, REQUEST_ID, BODY),
                Err(WebhookError::MalformedSignature),
                "header {header:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_non_hex_digest_rejected() {
        assert_eq!(
            verify_signature(SECRET, "ts=1700000000,v1=zzzz", REQUEST_ID, BODY),
            Err(WebhookError::MalformedSignature)
        );
    }

    #[test]
    fn test_parse_extracts_parts() {
        let parsed = SignatureHeader::parse("ts=1700000000,v1=deadbeef").unwrap();
        assert_eq!(parsed.ts, "1700000000");
        assert_eq!(parsed.v1, "deadbeef");
    }
}
