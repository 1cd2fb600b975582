//! Financial account model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AccountId;
use crate::error::{Field, FieldError, FinanceError, Result};

/// A user's financial account (bank account, wallet, card, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Balance when the account was opened.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub initial_balance: Decimal,
    /// Current balance, derived server-side from the transactions.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_balance: Option<Decimal>,
}

impl Account {
    /// Returns the current balance, falling back to the initial balance
    /// when the backend did not compute one.
    #[inline]
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.current_balance.unwrap_or(self.initial_balance)
    }
}

/// Payload for creating or updating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInput {
    /// Display name.
    pub name: String,
    /// Opening balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_balance: Decimal,
}

impl AccountInput {
    /// Creates an account payload.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>>(name: N, initial_balance: Decimal) -> Self {
        Self {
            name: name.into(),
            initial_balance,
        }
    }

    /// Checks the required fields before the payload is sent.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::Validation`] if the name is blank.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FinanceError::Validation(vec![FieldError::new(
                Field::Name,
                "account name is required",
            )]));
        }
        Ok(())
    }
}

/// Reference to an account inside another payload (`{"id": 1}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct AccountRef {
    /// Referenced account.
    pub(crate) id: AccountId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_account_with_current_balance() {
        let json = r#"{
            "id": 1,
            "name": "Nubank",
            "initialBalance": 1500.50,
            "currentBalance": 1320.25
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, AccountId::new(1));
        assert_eq!(account.name, "Nubank");
        assert_eq!(account.initial_balance, Decimal::new(150_050, 2));
        assert_eq!(account.balance(), Decimal::new(132_025, 2));
    }

    #[test]
    fn deserialize_account_without_current_balance() {
        let json = r#"{"id": 2, "name": "Carteira", "initialBalance": 80}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert!(account.current_balance.is_none());
        assert_eq!(account.balance(), Decimal::from(80));
    }

    #[test]
    fn serialize_input_as_camel_case_number() {
        let input = AccountInput::new("Itaú", Decimal::new(2500, 1));
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["name"], "Itaú");
        assert_eq!(value["initialBalance"], 250.0);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = AccountInput::new("   ", Decimal::ZERO).validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, Field::Name);
        assert!(AccountInput::new("Cash", Decimal::ZERO).validate().is_ok());
    }
}
