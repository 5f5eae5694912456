//! Payment status vocabulary and gateway translation.
//!
//! One canonical English status set is used everywhere; gateway strings are
//! translated at the boundary and unknown values are rejected rather than
//! stored raw.

pub mod webhook;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by payment status handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The gateway reported a status outside the known vocabulary.
    #[error("unknown gateway payment status: {0}")]
    UnknownGatewayStatus(String),

    /// A status string from the outside did not match.
    #[error("unknown payment status: {0}")]
    UnknownStatus(String),
}

/// Canonical status of a gateway payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, buyer has not paid yet.
    Pending,
    /// Gateway confirmed the charge.
    Approved,
    /// Gateway refused the charge.
    Rejected,
    /// Cancelled before settlement.
    Cancelled,
    /// Under gateway review.
    InProcess,
    /// Charge returned to the buyer.
    Refunded,
    /// Buyer disputed the charge.
    ChargedBack,
}

impl PaymentStatus {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::InProcess => "in_process",
            Self::Refunded => "refunded",
            Self::ChargedBack => "charged_back",
        }
    }

    /// Translates a raw gateway status string.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::UnknownGatewayStatus` for anything outside
    /// the documented vocabulary.
    pub fn from_gateway(status: &str) -> Result<Self, PaymentError> {
        match status {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            "in_process" => Ok(Self::InProcess),
            "refunded" => Ok(Self::Refunded),
            "charged_back" => Ok(Self::ChargedBack),
            other => Err(PaymentError::UnknownGatewayStatus(other.to_string())),
        }
    }

    /// Returns true when the payment settled successfully.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_gateway(s).map_err(|_| PaymentError::UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_vocabulary_maps() {
        assert_eq!(
            PaymentStatus::from_gateway("approved").unwrap(),
            PaymentStatus::Approved
        );
        assert_eq!(
            PaymentStatus::from_gateway("charged_back").unwrap(),
            PaymentStatus::ChargedBack
        );
        assert_eq!(
            PaymentStatus::from_gateway("in_process").unwrap(),
            PaymentStatus::InProcess
        );
    }

    #[test]
    fn test_unknown_gateway_status_rejected() {
        assert!(matches!(
            PaymentStatus::from_gateway("aprovado"),
            Err(PaymentError::UnknownGatewayStatus(_))
        ));
        assert!(PaymentStatus::from_gateway("").is_err());
    }

    #[test]
    fn test_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Approved,
            PaymentStatus::Rejected,
            PaymentStatus::Cancelled,
            PaymentStatus::InProcess,
            PaymentStatus::Refunded,
            PaymentStatus::ChargedBack,
        ] {
            assert_eq!(
                PaymentStatus::from_gateway(status.as_str()).unwrap(),
                status
            );
        }
    }
}
