//! Sale status rules and amount arithmetic.
//!
//! Totals are derived, never stored from user input: every save recomputes
//! `total_value = quantity * unit_price` and `final_value = total - discount`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use centralmei_shared::types::{ProductId, SaleId, ServiceRequestId, UserId};

/// Errors raised by sale arithmetic and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaleError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Unit price must not be negative.
    #[error("unit price must not be negative")]
    NegativeUnitPrice,

    /// Discount must not be negative.
    #[error("discount must not be negative")]
    NegativeDiscount,

    /// Discount larger than the total would produce a negative sale.
    #[error("discount {discount} exceeds total value {total}")]
    DiscountExceedsTotal {
        /// Requested discount.
        discount: Decimal,
        /// Computed total.
        total: Decimal,
    },

    /// A status string from the outside did not match any known status.
    #[error("unknown sale status: {0}")]
    UnknownStatus(String),

    /// A payment method string did not match any known method.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

/// Settlement status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Awaiting payment.
    Pending,
    /// Paid in full.
    Paid,
    /// Cancelled before settlement.
    Cancelled,
}

impl SaleStatus {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SaleStatus {
    type Err = SaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(SaleError::UnknownStatus(other.to_string())),
        }
    }
}

/// How a sale was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// PIX instant transfer.
    Pix,
    /// Bank transfer.
    BankTransfer,
    /// Boleto bancário.
    Boleto,
}

impl PaymentMethod {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Pix => "pix",
            Self::BankTransfer => "bank_transfer",
            Self::Boleto => "boleto",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = SaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "credit_card" => Ok(Self::CreditCard),
            "debit_card" => Ok(Self::DebitCard),
            "pix" => Ok(Self::Pix),
            "bank_transfer" => Ok(Self::BankTransfer),
            "boleto" => Ok(Self::Boleto),
            other => Err(SaleError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Derived monetary amounts of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleAmounts {
    /// `quantity * unit_price`.
    pub total_value: Decimal,
    /// `total_value - discount`.
    pub final_value: Decimal,
}

impl SaleAmounts {
    /// Computes the derived amounts for a sale.
    ///
    /// # Errors
    ///
    /// Rejects zero quantities, negative prices or discounts, and discounts
    /// that exceed the total.
    pub fn compute(
        quantity: u32,
        unit_price: Decimal,
        discount: Decimal,
    ) -> Result<Self, SaleError> {
        if quantity == 0 {
            return Err(SaleError::ZeroQuantity);
        }
        if unit_price.is_sign_negative() {
            return Err(SaleError::NegativeUnitPrice);
        }
        if discount.is_sign_negative() {
            return Err(SaleError::NegativeDiscount);
        }

        let total_value = Decimal::from(quantity) * unit_price;
        if discount > total_value {
            return Err(SaleError::DiscountExceedsTotal {
                discount,
                total: total_value,
            });
        }

        Ok(Self {
            total_value,
            final_value: total_value - discount,
        })
    }
}

/// Returns true when a saved sale must have a matching cash movement.
#[must_use]
pub fn triggers_cash_movement(status: SaleStatus, payment_date: Option<DateTime<Utc>>) -> bool {
    status == SaleStatus::Paid && payment_date.is_some()
}

/// Event raised when a sale is saved in paid state.
#[derive(Debug, Clone)]
pub struct SalePaid {
    /// The paid sale.
    pub sale_id: SaleId,
    /// Product sold (movement category/subcategory are copied from it).
    pub product_id: ProductId,
    /// Amount to enter in the cash book.
    pub final_value: Decimal,
    /// Settlement timestamp; the movement lands on its calendar date.
    pub payment_date: DateTime<Utc>,
    /// Staff user who owns the sale.
    pub created_by: UserId,
    /// Originating request when the sale came from automation.
    pub service_request_id: Option<ServiceRequestId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_amounts_round_trip() {
        let amounts = SaleAmounts::compute(2, dec!(50.00), dec!(10.00)).unwrap();
        assert_eq!(amounts.total_value, dec!(100.00));
        assert_eq!(amounts.final_value, dec!(90.00));
    }

    #[test]
    fn test_amounts_no_discount() {
        let amounts = SaleAmounts::compute(1, dec!(97.00), Decimal::ZERO).unwrap();
        assert_eq!(amounts.total_value, dec!(97.00));
        assert_eq!(amounts.final_value, dec!(97.00));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            SaleAmounts::compute(0, dec!(10.00), Decimal::ZERO),
            Err(SaleError::ZeroQuantity)
        );
    }

    #[test]
    fn test_negative_price_rejected() {
        assert_eq!(
            SaleAmounts::compute(1, dec!(-1.00), Decimal::ZERO),
            Err(SaleError::NegativeUnitPrice)
        );
    }

    #[test]
    fn test_discount_cannot_exceed_total() {
        let result = SaleAmounts::compute(1, dec!(50.00), dec!(60.00));
        assert!(matches!(
            result,
            Err(SaleError::DiscountExceedsTotal { .. })
        ));
    }

    #[test]
    fn test_movement_trigger_requires_paid_and_dated() {
        let now = Utc::now();
        assert!(triggers_cash_movement(SaleStatus::Paid, Some(now)));
        assert!(!triggers_cash_movement(SaleStatus::Paid, None));
        assert!(!triggers_cash_movement(SaleStatus::Pending, Some(now)));
        assert!(!triggers_cash_movement(SaleStatus::Cancelled, Some(now)));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [SaleStatus::Pending, SaleStatus::Paid, SaleStatus::Cancelled] {
            assert_eq!(SaleStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(SaleStatus::from_str("pago").is_err());
    }

    #[test]
    fn test_payment_method_round_trip() {
        assert_eq!(
            PaymentMethod::from_str("pix").unwrap(),
            PaymentMethod::Pix
        );
        assert!(PaymentMethod::from_str("cheque").is_err());
    }
}
