//! Dashboard summary models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income, spend and planned budget totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    /// Month label produced by the backend (e.g. `2025-janeiro`).
    pub title: String,
    /// Sum of expenses.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    /// Sum of incomes.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// Sum of planning estimates.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub planned_budget: Decimal,
}

impl MonthSummary {
    /// Income minus spend.
    #[inline]
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.total_income - self.total_spent
    }

    /// Planned budget minus spend (negative when overspent).
    #[inline]
    #[must_use]
    pub fn remaining_budget(&self) -> Decimal {
        self.planned_budget - self.total_spent
    }
}

/// Summaries for the previous, current and next month.
///
/// The backend answers with an empty object when no user is resolved, so
/// every slot is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Previous month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<MonthSummary>,
    /// Current month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<MonthSummary>,
    /// Next month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<MonthSummary>,
}

impl DashboardSummary {
    /// Iterates the present months in chronological order, labelled.
    #[inline]
    pub fn months(&self) -> impl Iterator<Item = (&'static str, &MonthSummary)> {
        [
            ("previous", self.previous.as_ref()),
            ("current", self.current.as_ref()),
            ("next", self.next.as_ref()),
        ]
        .into_iter()
        .filter_map(|(label, summary)| summary.map(|s| (label, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_summary_map() {
        let json = r#"{
            "current": {"title": "2025-janeiro", "totalSpent": 40, "totalIncome": 160, "plannedBudget": 100},
            "previous": {"title": "2024-dezembro", "totalSpent": 0, "totalIncome": 0, "plannedBudget": 0},
            "next": {"title": "2025-fevereiro", "totalSpent": 0, "totalIncome": 0, "plannedBudget": 250}
        }"#;
        let summary: DashboardSummary = serde_json::from_str(json).unwrap();
        let current = summary.current.as_ref().unwrap();
        assert_eq!(current.balance(), Decimal::from(120));
        assert_eq!(current.remaining_budget(), Decimal::from(60));

        let labels: Vec<&str> = summary.months().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["previous", "current", "next"]);
    }

    #[test]
    fn deserialize_empty_summary() {
        let summary: DashboardSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary, DashboardSummary::default());
        assert_eq!(summary.months().count(), 0);
    }
}
