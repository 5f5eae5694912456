//! Cash book: movements and daily balances.
//!
//! Every cash movement is a dated debit or credit line. Balances are kept
//! per calendar date and always derivable from the movements of that date
//! plus the closing balance of the most recent prior date:
//!
//! ```text
//! closing(D) = opening(D) + total_in(D) - total_out(D)
//! opening(D) = closing(max D' < D)   (0 when no prior date exists)
//! ```

pub mod report;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by cash book operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CashbookError {
    /// Movement amounts must be strictly positive.
    #[error("movement amount must be greater than zero")]
    NonPositiveAmount,

    /// A direction string from the outside did not match.
    #[error("unknown movement direction: {0}")]
    UnknownDirection(String),
}

/// Whether money entered or left the cash box.
///
/// Also used as the kind of an account category: an `in` category classifies
/// revenue movements, an `out` category classifies expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Money entering the cash box.
    In,
    /// Money leaving the cash box.
    Out,
}

impl MovementDirection {
    /// Wire representation, also used as the database value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementDirection {
    type Err = CashbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(CashbookError::UnknownDirection(other.to_string())),
        }
    }
}

/// Validates a movement amount.
///
/// # Errors
///
/// Returns `CashbookError::NonPositiveAmount` for zero or negative values.
pub fn validate_amount(amount: Decimal) -> Result<(), CashbookError> {
    if amount <= Decimal::ZERO {
        return Err(CashbookError::NonPositiveAmount);
    }
    Ok(())
}

/// Per-date movement totals split by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyTotals {
    /// Sum of `in` movements.
    pub total_in: Decimal,
    /// Sum of `out` movements.
    pub total_out: Decimal,
}

impl DailyTotals {
    /// Accumulates totals from `(direction, amount)` pairs.
    #[must_use]
    pub fn accumulate<I>(movements: I) -> Self
    where
        I: IntoIterator<Item = (MovementDirection, Decimal)>,
    {
        let mut totals = Self::default();
        for (direction, amount) in movements {
            match direction {
                MovementDirection::In => totals.total_in += amount,
                MovementDirection::Out => totals.total_out += amount,
            }
        }
        totals
    }
}

/// The balance row of one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyBalance {
    /// The date this row covers.
    pub date: NaiveDate,
    /// Closing balance of the most recent prior date (0 when none).
    pub opening_balance: Decimal,
    /// Sum of `in` movements on this date.
    pub total_in: Decimal,
    /// Sum of `out` movements on this date.
    pub total_out: Decimal,
    /// `opening + in - out`.
    pub closing_balance: Decimal,
}

impl DailyBalance {
    /// Derives the balance row for a date from its totals and the prior
    /// closing balance.
    #[must_use]
    pub fn derive(date: NaiveDate, opening_balance: Decimal, totals: DailyTotals) -> Self {
        Self {
            date,
            opening_balance,
            total_in: totals.total_in,
            total_out: totals.total_out,
            closing_balance: opening_balance + totals.total_in - totals.total_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(
            MovementDirection::from_str("in").unwrap(),
            MovementDirection::In
        );
        assert_eq!(
            MovementDirection::from_str("out").unwrap(),
            MovementDirection::Out
        );
        assert!(MovementDirection::from_str("entrada").is_err());
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert_eq!(
            validate_amount(Decimal::ZERO),
            Err(CashbookError::NonPositiveAmount)
        );
        assert_eq!(
            validate_amount(dec!(-5.00)),
            Err(CashbookError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_totals_split_by_direction() {
        let totals = DailyTotals::accumulate([
            (MovementDirection::In, dec!(100.00)),
            (MovementDirection::Out, dec!(30.00)),
            (MovementDirection::In, dec!(25.50)),
        ]);
        assert_eq!(totals.total_in, dec!(125.50));
        assert_eq!(totals.total_out, dec!(30.00));
    }

    #[test]
    fn test_balance_same_day_mix() {
        let totals = DailyTotals::accumulate([
            (MovementDirection::In, dec!(100)),
            (MovementDirection::Out, dec!(30)),
        ]);
        let balance = DailyBalance::derive(date(2026, 3, 10), dec!(500.00), totals);
        assert_eq!(balance.closing_balance, dec!(570.00));
    }

    #[test]
    fn test_balance_empty_day_carries_opening() {
        let balance = DailyBalance::derive(date(2026, 3, 11), dec!(570.00), DailyTotals::default());
        assert_eq!(balance.closing_balance, dec!(570.00));
    }

    proptest! {
        /// closing = opening + in - out holds for any derived balance.
        #[test]
        fn prop_balance_identity(
            opening_cents in -1_000_000i64..1_000_000i64,
            ins in proptest::collection::vec(1i64..100_000i64, 0..20),
            outs in proptest::collection::vec(1i64..100_000i64, 0..20),
        ) {
            let opening = Decimal::new(opening_cents, 2);
            let movements = ins
                .iter()
                .map(|&c| (MovementDirection::In, Decimal::new(c, 2)))
                .chain(outs.iter().map(|&c| (MovementDirection::Out, Decimal::new(c, 2))));
            let totals = DailyTotals::accumulate(movements);
            let balance = DailyBalance::derive(date(2026, 1, 15), opening, totals);

            prop_assert_eq!(
                balance.closing_balance,
                balance.opening_balance + balance.total_in - balance.total_out
            );
        }

        /// Accumulation order never changes the totals.
        #[test]
        fn prop_totals_order_independent(
            amounts in proptest::collection::vec((0u8..2u8, 1i64..100_000i64), 0..30)
        ) {
            let movements: Vec<(MovementDirection, Decimal)> = amounts
                .iter()
                .map(|&(d, c)| {
                    let direction = if d == 0 { MovementDirection::In } else { MovementDirection::Out };
                    (direction, Decimal::new(c, 2))
                })
                .collect();

            let forward = DailyTotals::accumulate(movements.iter().copied());
            let reversed = DailyTotals::accumulate(movements.iter().rev().copied());
            prop_assert_eq!(forward, reversed);
        }
    }
}
