//! Integration-style tests for the ledger chain.
//!
//! Exercises the full pure pipeline behind the automation engine:
//! completion detection -> sale amounts -> movement totals -> chained
//! daily balances. Repository wiring is covered by the pure decision
//! logic these tests drive.

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use centralmei_core::cashbook::{DailyBalance, DailyTotals, MovementDirection};
    use centralmei_core::request::{RequestStatus, SaleDecision, decide_sale_creation};
    use centralmei_core::sales::{SaleAmounts, SaleStatus, triggers_cash_movement};
    use centralmei_shared::types::UserId;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    /// Chains balances over consecutive dates the way recompute does:
    /// each day's opening is the previous day's closing.
    fn chain_balances(
        start: NaiveDate,
        days: &[Vec<(MovementDirection, Decimal)>],
    ) -> Vec<DailyBalance> {
        let mut opening = Decimal::ZERO;
        let mut balances = Vec::with_capacity(days.len());

        for (offset, movements) in days.iter().enumerate() {
            let date = start + Days::new(offset as u64);
            let totals = DailyTotals::accumulate(movements.iter().copied());
            let balance = DailyBalance::derive(date, opening, totals);
            opening = balance.closing_balance;
            balances.push(balance);
        }

        balances
    }

    /// The full automation scenario from a completed request: a 97.00
    /// request produces a paid sale of 97.00, one incoming movement of
    /// 97.00, and a day's balance 97.00 higher.
    #[test]
    fn test_completed_request_flows_into_balance() {
        let previous = RequestStatus::Pending;
        let new = RequestStatus::Completed;
        assert!(new.completes(previous));

        let operator = UserId::new();
        let decision = decide_sale_creation(false, false, Some(operator));
        assert_eq!(decision, SaleDecision::Create(operator));

        let service_value = dec!(97.00);
        let amounts = SaleAmounts::compute(1, service_value, Decimal::ZERO).unwrap();
        assert_eq!(amounts.final_value, dec!(97.00));

        let balances = chain_balances(
            start_date(),
            &[vec![(MovementDirection::In, amounts.final_value)]],
        );
        assert_eq!(balances[0].closing_balance, dec!(97.00));
        assert_eq!(
            balances[0].closing_balance - balances[0].opening_balance,
            service_value
        );
    }

    /// A second completion of the same request makes no second sale,
    /// whichever guard catches it.
    #[test]
    fn test_second_completion_is_inert() {
        // Re-save of an already-completed request: no event at all
        assert!(!RequestStatus::Completed.completes(RequestStatus::Completed));

        // Flag persisted: skip
        assert_eq!(
            decide_sale_creation(true, false, Some(UserId::new())),
            SaleDecision::SkipFlagged
        );

        // Flag write lost the race but the sale row exists: repair, skip
        assert_eq!(
            decide_sale_creation(false, true, Some(UserId::new())),
            SaleDecision::SkipExisting
        );
    }

    /// A pending sale never reaches the cash book; paying it does.
    #[test]
    fn test_only_settled_sales_reach_the_cash_book() {
        assert!(!triggers_cash_movement(SaleStatus::Pending, None));
        assert!(!triggers_cash_movement(
            SaleStatus::Cancelled,
            Some(chrono::Utc::now())
        ));
        assert!(triggers_cash_movement(
            SaleStatus::Paid,
            Some(chrono::Utc::now())
        ));
    }

    /// Mixed-direction day: in 100, out 30 on one date.
    #[test]
    fn test_mixed_day_balances() {
        let balances = chain_balances(
            start_date(),
            &[
                vec![(MovementDirection::In, dec!(500.00))],
                vec![
                    (MovementDirection::In, dec!(100.00)),
                    (MovementDirection::Out, dec!(30.00)),
                ],
            ],
        );

        assert_eq!(balances[1].opening_balance, dec!(500.00));
        assert_eq!(balances[1].total_in, dec!(100.00));
        assert_eq!(balances[1].total_out, dec!(30.00));
        assert_eq!(
            balances[1].closing_balance,
            balances[1].opening_balance + dec!(70.00)
        );
    }

    fn movement_strategy() -> impl Strategy<Value = (MovementDirection, Decimal)> {
        (0u8..2u8, 1i64..1_000_000i64).prop_map(|(direction, cents)| {
            let direction = if direction == 0 {
                MovementDirection::In
            } else {
                MovementDirection::Out
            };
            (direction, Decimal::new(cents, 2))
        })
    }

    proptest! {
        /// *For any* sequence of days, every day's opening equals the
        /// previous day's closing and every closing satisfies
        /// `opening + in - out`.
        #[test]
        fn prop_balance_chain_is_consistent(
            days in proptest::collection::vec(
                proptest::collection::vec(movement_strategy(), 0..8),
                1..12,
            )
        ) {
            let balances = chain_balances(start_date(), &days);

            for balance in &balances {
                prop_assert_eq!(
                    balance.closing_balance,
                    balance.opening_balance + balance.total_in - balance.total_out
                );
            }
            for pair in balances.windows(2) {
                prop_assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
            }
        }

        /// *For any* quantity/price/discount accepted by the arithmetic,
        /// the derived movement amount equals `quantity * price - discount`.
        #[test]
        fn prop_sale_amounts_feed_movements(
            quantity in 1u32..100u32,
            price_cents in 1i64..1_000_000i64,
            discount_cents in 0i64..1_000i64,
        ) {
            let unit_price = Decimal::new(price_cents, 2);
            let discount = Decimal::new(discount_cents, 2);
            prop_assume!(discount <= Decimal::from(quantity) * unit_price);

            let amounts = SaleAmounts::compute(quantity, unit_price, discount).unwrap();
            prop_assert_eq!(
                amounts.final_value,
                Decimal::from(quantity) * unit_price - discount
            );

            let totals = DailyTotals::accumulate([(MovementDirection::In, amounts.final_value)]);
            prop_assert_eq!(totals.total_in, amounts.final_value);
        }
    }
}
