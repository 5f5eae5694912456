//! Cash-balance repository.
//!
//! Owns the per-date balance rows. `recompute_for` is the single write
//! path: it re-derives a date's totals from its movements, chains the
//! opening balance off the most recent prior row, and upserts the result.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use centralmei_core::cashbook::{DailyBalance, DailyTotals};

use crate::entities::{cash_balances, cash_movements};

/// Error types for balance operations.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Cash-balance repository.
#[derive(Debug, Clone)]
pub struct CashBalanceRepository {
    db: DatabaseConnection,
}

impl CashBalanceRepository {
    /// Creates a new cash-balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Recomputes and upserts the balance row for a date.
    ///
    /// Must be called after every movement create, update, or delete,
    /// with the movement's date (both dates when an update moved it).
    pub async fn recompute_for(&self, date: NaiveDate) -> Result<cash_balances::Model, BalanceError> {
        let movements = cash_movements::Entity::find()
            .filter(cash_movements::Column::MovementDate.eq(date))
            .all(&self.db)
            .await?;

        let totals = DailyTotals::accumulate(
            movements
                .iter()
                .map(|m| (m.direction.into(), m.amount)),
        );

        let opening = self
            .latest_before(date)
            .await?
            .map_or(Decimal::ZERO, |row| row.closing_balance);

        let derived = DailyBalance::derive(date, opening, totals);

        let existing = cash_balances::Entity::find()
            .filter(cash_balances::Column::Date.eq(date))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(row) => {
                let mut active: cash_balances::ActiveModel = row.into();
                active.opening_balance = Set(derived.opening_balance);
                active.total_in = Set(derived.total_in);
                active.total_out = Set(derived.total_out);
                active.closing_balance = Set(derived.closing_balance);
                active.updated_at = Set(Utc::now().into());
                active.update(&self.db).await?
            }
            None => {
                let active = cash_balances::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    date: Set(date),
                    opening_balance: Set(derived.opening_balance),
                    total_in: Set(derived.total_in),
                    total_out: Set(derived.total_out),
                    closing_balance: Set(derived.closing_balance),
                    updated_at: Set(Utc::now().into()),
                };
                active.insert(&self.db).await?
            }
        };

        Ok(model)
    }

    /// Returns the most recent balance row strictly before `date`.
    pub async fn latest_before(
        &self,
        date: NaiveDate,
    ) -> Result<Option<cash_balances::Model>, BalanceError> {
        Ok(cash_balances::Entity::find()
            .filter(cash_balances::Column::Date.lt(date))
            .order_by_desc(cash_balances::Column::Date)
            .one(&self.db)
            .await?)
    }

    /// Returns the most recent balance row overall.
    pub async fn latest(&self) -> Result<Option<cash_balances::Model>, BalanceError> {
        Ok(cash_balances::Entity::find()
            .order_by_desc(cash_balances::Column::Date)
            .one(&self.db)
            .await?)
    }

    /// Lists balance rows inside an inclusive date range, oldest first.
    pub async fn list_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<cash_balances::Model>, BalanceError> {
        Ok(cash_balances::Entity::find()
            .filter(cash_balances::Column::Date.gte(start))
            .filter(cash_balances::Column::Date.lte(end))
            .order_by_asc(cash_balances::Column::Date)
            .all(&self.db)
            .await?)
    }
}
