//! Cumulative income/expense/transfer series for the transaction chart.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TransactionType};

/// Window of history shown by the chart, ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    /// The last 7 days.
    Week,
    /// The last calendar month.
    #[default]
    Month,
    /// The last calendar year.
    Year,
    /// Everything.
    Max,
}

impl TimeRange {
    /// Every range, in display order.
    pub const ALL: [Self; 4] = [Self::Week, Self::Month, Self::Year, Self::Max];

    /// Short selector label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Week => "1S",
            Self::Month => "1M",
            Self::Year => "1A",
            Self::Max => "Max",
        }
    }

    /// Cut-off for a window ending on `today`: only days strictly after it
    /// are shown. `None` for an unbounded window.
    #[inline]
    #[must_use]
    pub fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Week => today.checked_sub_days(Days::new(7)),
            Self::Month => today.checked_sub_months(Months::new(1)),
            Self::Year => today.checked_sub_months(Months::new(12)),
            Self::Max => None,
        }
    }
}

impl fmt::Display for TimeRange {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown time range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time range `{0}` (expected week, month, year or max)")]
pub struct ParseTimeRangeError(String);

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1s" | "1w" | "week" | "semana" => Ok(Self::Week),
            "1m" | "month" | "mes" => Ok(Self::Month),
            "1a" | "1y" | "year" | "ano" => Ok(Self::Year),
            "max" | "all" => Ok(Self::Max),
            _ => Err(ParseTimeRangeError(s.to_owned())),
        }
    }
}

/// Running totals up to and including `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Calendar day.
    pub date: NaiveDate,
    /// Cumulative income (`ENTRADA`).
    pub income: Decimal,
    /// Cumulative expense (`SAIDA` and `CARTAO`).
    pub expense: Decimal,
    /// Cumulative transfers (`MOVIMENTACAO`).
    pub transfer: Decimal,
}

/// Per-day sums before accumulation.
#[derive(Debug, Default, Clone, Copy)]
struct DayTotals {
    /// Income on the day.
    income: Decimal,
    /// Expense on the day.
    expense: Decimal,
    /// Transfers on the day.
    transfer: Decimal,
}

/// Builds the cumulative series for transactions dated after the cut-off
/// of `range` and no later than `today`, one point per day that has
/// transactions, in ascending date order.
#[inline]
#[must_use]
pub fn cumulative_series(
    transactions: &[Transaction],
    range: TimeRange,
    today: NaiveDate,
) -> Vec<ChartPoint> {
    let cutoff = range.cutoff(today);
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.creation_date <= today && cutoff.is_none_or(|c| tx.creation_date > c))
    {
        let totals = days.entry(tx.creation_date).or_default();
        match tx.transaction_type {
            TransactionType::Income => totals.income += tx.amount,
            TransactionType::Expense | TransactionType::CreditCard => totals.expense += tx.amount,
            TransactionType::Transfer => totals.transfer += tx.amount,
        }
    }

    let mut running = DayTotals::default();
    days.into_iter()
        .map(|(date, day)| {
            running.income += day.income;
            running.expense += day.expense;
            running.transfer += day.transfer;
            ChartPoint {
                date,
                income: running.income,
                expense: running.expense,
                transfer: running.transfer,
            }
        })
        .collect()
}
