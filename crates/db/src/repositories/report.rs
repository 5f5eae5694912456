//! Reporting repository: filtered movement reports and the back-office
//! dashboard summary.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use centralmei_core::cashbook::MovementDirection;
use centralmei_core::cashbook::report::{MovementSort, ReportPeriod, ReportSummary};

use crate::entities::{cash_balances, cash_movements, sales, sea_orm_active_enums};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter criteria for a movement report.
#[derive(Debug, Clone, Default)]
pub struct MovementReportFilter {
    /// Filter by direction.
    pub direction: Option<MovementDirection>,
    /// Filter by category.
    pub category_id: Option<Uuid>,
    /// Filter by subcategory.
    pub subcategory_id: Option<Uuid>,
    /// Named period; overrides the explicit range when present.
    pub period: Option<ReportPeriod>,
    /// Explicit range start.
    pub date_from: Option<NaiveDate>,
    /// Explicit range end.
    pub date_to: Option<NaiveDate>,
    /// Result ordering.
    pub sort: MovementSort,
}

impl MovementReportFilter {
    /// Resolves the effective inclusive date range against an anchor date.
    #[must_use]
    pub fn resolve_range(
        &self,
        anchor: NaiveDate,
    ) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.period {
            Some(period) => {
                let (start, end) = period.resolve(anchor);
                (Some(start), Some(end))
            }
            None => (self.date_from, self.date_to),
        }
    }
}

/// Month-to-date numbers for the back-office dashboard.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    /// Sum of paid-sale final values this month.
    pub month_sales_total: Decimal,
    /// Number of paid sales this month.
    pub month_sales_count: u64,
    /// Sum of `in` movements this month.
    pub month_total_in: Decimal,
    /// Sum of `out` movements this month.
    pub month_total_out: Decimal,
    /// Latest daily balance row, if any.
    pub latest_balance: Option<cash_balances::Model>,
}

/// Reporting repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new reporting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs a movement report: matching rows plus aggregate totals.
    ///
    /// `anchor` is the date named periods resolve against (the current
    /// date in production).
    pub async fn movement_report(
        &self,
        filter: &MovementReportFilter,
        anchor: NaiveDate,
    ) -> Result<(Vec<cash_movements::Model>, ReportSummary), ReportRepoError> {
        let (start, end) = filter.resolve_range(anchor);

        let mut query = cash_movements::Entity::find();

        if let Some(direction) = filter.direction {
            let direction: sea_orm_active_enums::MovementDirection = direction.into();
            query = query.filter(cash_movements::Column::Direction.eq(direction));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(cash_movements::Column::CategoryId.eq(category_id));
        }
        if let Some(subcategory_id) = filter.subcategory_id {
            query = query.filter(cash_movements::Column::SubcategoryId.eq(subcategory_id));
        }
        if let Some(start) = start {
            query = query.filter(cash_movements::Column::MovementDate.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(cash_movements::Column::MovementDate.lte(end));
        }

        query = match filter.sort {
            MovementSort::DateDesc => query.order_by_desc(cash_movements::Column::MovementDate),
            MovementSort::DateAsc => query.order_by_asc(cash_movements::Column::MovementDate),
            MovementSort::AmountDesc => query.order_by_desc(cash_movements::Column::Amount),
            MovementSort::AmountAsc => query.order_by_asc(cash_movements::Column::Amount),
            MovementSort::Category => query
                .order_by_asc(cash_movements::Column::CategoryId)
                .order_by_asc(cash_movements::Column::SubcategoryId),
        };

        let rows = query.all(&self.db).await?;
        let summary =
            ReportSummary::from_movements(rows.iter().map(|m| (m.direction.into(), m.amount)));

        Ok((rows, summary))
    }

    /// Builds the month-to-date dashboard summary.
    pub async fn dashboard_summary(
        &self,
        today: NaiveDate,
    ) -> Result<DashboardSummary, ReportRepoError> {
        let month_start = today.with_day(1).unwrap_or(today);
        let month_start_at: DateTime<Utc> = month_start
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let paid_sales = sales::Entity::find()
            .filter(sales::Column::Status.eq(sea_orm_active_enums::SaleStatus::Paid))
            .filter(sales::Column::SoldAt.gte(month_start_at))
            .all(&self.db)
            .await?;

        let month_sales_total = paid_sales.iter().map(|s| s.final_value).sum();
        let month_sales_count = paid_sales.len() as u64;

        let movements = cash_movements::Entity::find()
            .filter(cash_movements::Column::MovementDate.gte(month_start))
            .filter(cash_movements::Column::MovementDate.lte(today))
            .all(&self.db)
            .await?;

        let summary =
            ReportSummary::from_movements(movements.iter().map(|m| (m.direction.into(), m.amount)));

        let latest_balance = cash_balances::Entity::find()
            .order_by_desc(cash_balances::Column::Date)
            .one(&self.db)
            .await?;

        Ok(DashboardSummary {
            month_sales_total,
            month_sales_count,
            month_total_in: summary.total_in,
            month_total_out: summary.total_out,
            latest_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_named_period_overrides_explicit_range() {
        let filter = MovementReportFilter {
            period: Some(ReportPeriod::Last7Days),
            date_from: Some(date(2020, 1, 1)),
            date_to: Some(date(2020, 12, 31)),
            ..Default::default()
        };

        let (start, end) = filter.resolve_range(date(2026, 3, 18));
        assert_eq!(start, Some(date(2026, 3, 12)));
        assert_eq!(end, Some(date(2026, 3, 18)));
    }

    #[test]
    fn test_explicit_range_passes_through() {
        let filter = MovementReportFilter {
            date_from: Some(date(2026, 1, 1)),
            ..Default::default()
        };

        let (start, end) = filter.resolve_range(date(2026, 3, 18));
        assert_eq!(start, Some(date(2026, 1, 1)));
        assert_eq!(end, None);
    }
}
