//! Service-request lifecycle.
//!
//! A service request tracks one applicant's MEI bureaucratic service from
//! intake to conclusion. The only transition with side effects is the one
//! into [`RequestStatus::Completed`], which raises a [`RequestCompleted`]
//! event for the ledger automation engine.

mod automation;

pub use automation::{SaleDecision, decide_sale_creation, resolve_operator};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use centralmei_shared::types::{ServiceRequestId, UserId};

/// Errors raised by request lifecycle operations.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A status string from the outside did not match any known status.
    #[error("unknown request status: {0}")]
    UnknownStatus(String),

    /// A service kind string did not match any known kind.
    #[error("unknown service kind: {0}")]
    UnknownServiceKind(String),

    /// An operating mode string did not match any known mode.
    #[error("unknown operating mode: {0}")]
    UnknownOperatingMode(String),
}

/// The MEI bureaucratic service being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Open a new MEI registration.
    OpenMei,
    /// Regularize an existing MEI.
    RegularizeMei,
    /// File the annual revenue declaration.
    AnnualDeclaration,
    /// Close an MEI registration.
    CloseMei,
}

impl ServiceKind {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenMei => "open_mei",
            Self::RegularizeMei => "regularize_mei",
            Self::AnnualDeclaration => "annual_declaration",
            Self::CloseMei => "close_mei",
        }
    }

    /// Human-readable label for checkout descriptions.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OpenMei => "Abertura de MEI",
            Self::RegularizeMei => "Regularização de MEI",
            Self::AnnualDeclaration => "Declaração Anual MEI",
            Self::CloseMei => "Baixa de MEI",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open_mei" => Ok(Self::OpenMei),
            "regularize_mei" => Ok(Self::RegularizeMei),
            "annual_declaration" => Ok(Self::AnnualDeclaration),
            "close_mei" => Ok(Self::CloseMei),
            other => Err(RequestError::UnknownServiceKind(other.to_string())),
        }
    }
}

/// How the applicant's business operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Fixed establishment.
    Fixed,
    /// Internet sales.
    Internet,
    /// Telesales.
    Telesales,
    /// Door-to-door sales.
    DoorToDoor,
    /// Mail order.
    Mail,
    /// Fixed location outside a store.
    FixedExternal,
    /// Vending machines.
    VendingMachines,
}

impl OperatingMode {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Internet => "internet",
            Self::Telesales => "telesales",
            Self::DoorToDoor => "door_to_door",
            Self::Mail => "mail",
            Self::FixedExternal => "fixed_external",
            Self::VendingMachines => "vending_machines",
        }
    }
}

impl std::str::FromStr for OperatingMode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "internet" => Ok(Self::Internet),
            "telesales" => Ok(Self::Telesales),
            "door_to_door" => Ok(Self::DoorToDoor),
            "mail" => Ok(Self::Mail),
            "fixed_external" => Ok(Self::FixedExternal),
            "vending_machines" => Ok(Self::VendingMachines),
            other => Err(RequestError::UnknownOperatingMode(other.to_string())),
        }
    }
}

/// Lifecycle status of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, not yet picked up by staff.
    Pending,
    /// Being worked by staff.
    Processing,
    /// Service delivered.
    Completed,
    /// Abandoned or refused.
    Cancelled,
}

impl RequestStatus {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true when moving from `previous` to `self` concludes the
    /// request. Re-saving an already-completed request does not count.
    #[must_use]
    pub fn completes(self, previous: Self) -> bool {
        self == Self::Completed && previous != Self::Completed
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(RequestError::UnknownStatus(other.to_string())),
        }
    }
}

/// Event raised when a service request reaches completed status.
///
/// Carries everything the ledger automation needs so the handler does not
/// have to reach back into the request row.
#[derive(Debug, Clone)]
pub struct RequestCompleted {
    /// The request that was concluded.
    pub request_id: ServiceRequestId,
    /// Applicant full name (buyer snapshot for the sale).
    pub customer_name: String,
    /// Applicant email.
    pub customer_email: String,
    /// Applicant phone.
    pub customer_phone: String,
    /// Applicant CPF.
    pub customer_cpf: String,
    /// Amount charged for the service.
    pub service_value: Decimal,
    /// Account the applicant submitted under, if any.
    pub user_id: Option<UserId>,
    /// When the transition happened.
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Processing,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(matches!(
            RequestStatus::from_str("concluido"),
            Err(RequestError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_completion_fires_on_first_transition_only() {
        assert!(RequestStatus::Completed.completes(RequestStatus::Pending));
        assert!(RequestStatus::Completed.completes(RequestStatus::Processing));
        assert!(!RequestStatus::Completed.completes(RequestStatus::Completed));
    }

    #[test]
    fn test_non_completed_targets_never_fire() {
        assert!(!RequestStatus::Cancelled.completes(RequestStatus::Pending));
        assert!(!RequestStatus::Processing.completes(RequestStatus::Pending));
        assert!(!RequestStatus::Pending.completes(RequestStatus::Completed));
    }

    #[test]
    fn test_service_kind_labels() {
        assert_eq!(ServiceKind::OpenMei.label(), "Abertura de MEI");
        assert_eq!(
            ServiceKind::from_str("annual_declaration").unwrap(),
            ServiceKind::AnnualDeclaration
        );
    }
}
