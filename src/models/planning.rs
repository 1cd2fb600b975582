//! Monthly budget planning model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use super::{Category, CategoryId, PlanningId};
use crate::error::{Field, FieldError, FinanceError, Result};

/// A budgeted estimate for a category in a given month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningEntry {
    /// Unique identifier.
    pub id: PlanningId,
    /// Month (1–12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Planned category (`None` plans the whole month).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Planned amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_amount: Decimal,
    /// Amount actually spent, computed by the backend.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub spent_amount: Option<Decimal>,
}

impl PlanningEntry {
    /// Returns the `YYYY-MM` key of the entry.
    #[inline]
    #[must_use]
    pub fn year_month(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// Returns the amount still available (negative when overspent).
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.estimated_amount - self.spent_amount.unwrap_or(Decimal::ZERO)
    }

    /// Whether the actual spend exceeds the estimate.
    #[inline]
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.remaining() < Decimal::ZERO
    }
}

/// Payload for creating or updating a planning entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningInput {
    /// Month (1–12).
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Planned category.
    pub category: Option<CategoryId>,
    /// Planned amount.
    pub estimated_amount: Decimal,
}

/// Wire shape of a planning create/update request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanningPayload {
    /// Month.
    month: u32,
    /// Year.
    year: i32,
    /// Category reference, sent as `null` when absent.
    category: Option<CategoryRef>,
    /// Planned amount.
    #[serde(with = "rust_decimal::serde::float")]
    estimated_amount: Decimal,
}

impl Serialize for PlanningInput {
    #[inline]
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        PlanningPayload {
            month: self.month,
            year: self.year,
            category: self.category.map(|id| CategoryRef { id }),
            estimated_amount: self.estimated_amount,
        }
        .serialize(serializer)
    }
}

impl PlanningInput {
    /// Checks month range and amount sign before the payload is sent.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::Validation`] listing every invalid field.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if !(1..=12).contains(&self.month) {
            errors.push(FieldError::new(Field::Month, "month must be between 1 and 12"));
        }
        if self.year < 1900 {
            errors.push(FieldError::new(Field::Year, "year is out of range"));
        }
        if self.estimated_amount < Decimal::ZERO {
            errors.push(FieldError::new(
                Field::EstimatedAmount,
                "estimated amount cannot be negative",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FinanceError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_entry_with_spend() {
        let json = r#"{
            "id": 7,
            "month": 3,
            "year": 2025,
            "category": {"id": 2, "name": "Mercado"},
            "estimatedAmount": 800,
            "spentAmount": 950.5
        }"#;
        let entry: PlanningEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.year_month(), "2025-03");
        assert_eq!(entry.remaining(), Decimal::new(-1505, 1));
        assert!(entry.is_over_budget());
    }

    #[test]
    fn entry_without_spend_has_full_budget() {
        let json = r#"{"id": 8, "month": 12, "year": 2024, "category": null, "estimatedAmount": 300}"#;
        let entry: PlanningEntry = serde_json::from_str(json).unwrap();
        assert!(entry.category.is_none());
        assert_eq!(entry.remaining(), Decimal::from(300));
        assert!(!entry.is_over_budget());
    }

    #[test]
    fn input_serializes_null_category() {
        let input = PlanningInput {
            month: 1,
            year: 2025,
            category: None,
            estimated_amount: Decimal::from(100),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value["category"].is_null());
        assert_eq!(value["estimatedAmount"], 100.0);
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let input = PlanningInput {
            month: 13,
            year: 2025,
            category: Some(CategoryId::new(1)),
            estimated_amount: Decimal::from(-1),
        };
        let err = input.validate().unwrap_err();
        let fields: Vec<Field> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Month, Field::EstimatedAmount]);
    }
}
