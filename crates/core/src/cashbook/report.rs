//! Report filtering: named period resolution and movement summaries.
//!
//! Named periods resolve against an anchor date (the current date in
//! production, a fixed date in tests) into an inclusive `[start, end]`
//! range. Weeks follow ISO convention and start on Monday.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MovementDirection;

/// Errors raised by report filter parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A period name from the outside did not match.
    #[error("unknown report period: {0}")]
    UnknownPeriod(String),

    /// A sort order name from the outside did not match.
    #[error("unknown sort order: {0}")]
    UnknownSort(String),
}

/// Predefined report date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// The anchor date itself.
    Today,
    /// The day before the anchor.
    Yesterday,
    /// Monday of the anchor's week through the anchor.
    ThisWeek,
    /// The full Monday-Sunday week before the anchor's.
    LastWeek,
    /// First of the anchor's month through the anchor.
    ThisMonth,
    /// The full calendar month before the anchor's.
    LastMonth,
    /// The 7 days ending at the anchor.
    Last7Days,
    /// The 30 days ending at the anchor.
    Last30Days,
    /// The 90 days ending at the anchor.
    Last90Days,
}

impl ReportPeriod {
    /// Resolves the period to an inclusive `[start, end]` range around
    /// `anchor`.
    #[must_use]
    pub fn resolve(self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Today => (anchor, anchor),
            Self::Yesterday => {
                let yesterday = anchor - Days::new(1);
                (yesterday, yesterday)
            }
            Self::ThisWeek => {
                let monday = anchor - Days::new(u64::from(anchor.weekday().num_days_from_monday()));
                (monday, anchor)
            }
            Self::LastWeek => {
                let this_monday =
                    anchor - Days::new(u64::from(anchor.weekday().num_days_from_monday()));
                let start = this_monday - Days::new(7);
                (start, start + Days::new(6))
            }
            Self::ThisMonth => (anchor.with_day(1).unwrap_or(anchor), anchor),
            Self::LastMonth => {
                let first_of_this = anchor.with_day(1).unwrap_or(anchor);
                let end = first_of_this - Days::new(1);
                (end.with_day(1).unwrap_or(end), end)
            }
            Self::Last7Days => (anchor - Days::new(6), anchor),
            Self::Last30Days => (anchor - Days::new(29), anchor),
            Self::Last90Days => (anchor - Days::new(89), anchor),
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "this_week" => Ok(Self::ThisWeek),
            "last_week" => Ok(Self::LastWeek),
            "this_month" => Ok(Self::ThisMonth),
            "last_month" => Ok(Self::LastMonth),
            "last_7_days" => Ok(Self::Last7Days),
            "last_30_days" => Ok(Self::Last30Days),
            "last_90_days" => Ok(Self::Last90Days),
            other => Err(ReportError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Sort orders accepted by the movement report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSort {
    /// Newest first (default).
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Largest amount first.
    AmountDesc,
    /// Smallest amount first.
    AmountAsc,
    /// Grouped by category, then subcategory name.
    Category,
}

impl std::str::FromStr for MovementSort {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_desc" => Ok(Self::DateDesc),
            "date_asc" => Ok(Self::DateAsc),
            "amount_desc" => Ok(Self::AmountDesc),
            "amount_asc" => Ok(Self::AmountAsc),
            "category" => Ok(Self::Category),
            other => Err(ReportError::UnknownSort(other.to_string())),
        }
    }
}

/// Aggregate line of a movement report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Number of matching movements.
    pub count: u64,
    /// Sum of `in` movements.
    pub total_in: Decimal,
    /// Sum of `out` movements.
    pub total_out: Decimal,
    /// `total_in - total_out`.
    pub balance: Decimal,
}

impl ReportSummary {
    /// Builds the summary from `(direction, amount)` pairs.
    #[must_use]
    pub fn from_movements<I>(movements: I) -> Self
    where
        I: IntoIterator<Item = (MovementDirection, Decimal)>,
    {
        let mut summary = Self::default();
        for (direction, amount) in movements {
            summary.count += 1;
            match direction {
                MovementDirection::In => summary.total_in += amount,
                MovementDirection::Out => summary.total_out += amount,
            }
        }
        summary.balance = summary.total_in - summary.total_out;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2026-03-18 is a Wednesday.
    const ANCHOR: (i32, u32, u32) = (2026, 3, 18);

    #[rstest]
    #[case(ReportPeriod::Today, (2026, 3, 18), (2026, 3, 18))]
    #[case(ReportPeriod::Yesterday, (2026, 3, 17), (2026, 3, 17))]
    #[case(ReportPeriod::ThisWeek, (2026, 3, 16), (2026, 3, 18))]
    #[case(ReportPeriod::LastWeek, (2026, 3, 9), (2026, 3, 15))]
    #[case(ReportPeriod::ThisMonth, (2026, 3, 1), (2026, 3, 18))]
    #[case(ReportPeriod::LastMonth, (2026, 2, 1), (2026, 2, 28))]
    #[case(ReportPeriod::Last7Days, (2026, 3, 12), (2026, 3, 18))]
    #[case(ReportPeriod::Last30Days, (2026, 2, 17), (2026, 3, 18))]
    #[case(ReportPeriod::Last90Days, (2025, 12, 19), (2026, 3, 18))]
    fn test_period_resolution(
        #[case] period: ReportPeriod,
        #[case] start: (i32, u32, u32),
        #[case] end: (i32, u32, u32),
    ) {
        let anchor = date(ANCHOR.0, ANCHOR.1, ANCHOR.2);
        assert_eq!(
            period.resolve(anchor),
            (date(start.0, start.1, start.2), date(end.0, end.1, end.2))
        );
    }

    #[test]
    fn test_this_week_on_monday_is_single_day() {
        let monday = date(2026, 3, 16);
        assert_eq!(ReportPeriod::ThisWeek.resolve(monday), (monday, monday));
    }

    #[test]
    fn test_last_month_across_year_boundary() {
        let anchor = date(2026, 1, 10);
        assert_eq!(
            ReportPeriod::LastMonth.resolve(anchor),
            (date(2025, 12, 1), date(2025, 12, 31))
        );
    }

    #[test]
    fn test_period_from_str() {
        assert_eq!(
            ReportPeriod::from_str("last_7_days").unwrap(),
            ReportPeriod::Last7Days
        );
        assert!(ReportPeriod::from_str("ultimos_7_dias").is_err());
    }

    #[test]
    fn test_summary_totals() {
        let summary = ReportSummary::from_movements([
            (MovementDirection::In, dec!(100.00)),
            (MovementDirection::Out, dec!(30.00)),
            (MovementDirection::In, dec!(5.00)),
        ]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_in, dec!(105.00));
        assert_eq!(summary.total_out, dec!(30.00));
        assert_eq!(summary.balance, dec!(75.00));
    }

    #[test]
    fn test_summary_empty() {
        let summary = ReportSummary::from_movements(std::iter::empty());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.balance, Decimal::ZERO);
    }
}
