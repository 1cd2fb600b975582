//! Transaction model, input variants and client-side validation.

use core::fmt;
use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use super::account::AccountRef;
use super::category::CategoryRef;
use super::{Account, AccountId, Category, CategoryId, TransactionId};
use crate::error::{Field, FieldError, FinanceError, Result};

/// Kind of a transaction.
///
/// The wire names are the backend's Portuguese constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money entering an account (`ENTRADA`).
    #[serde(rename = "ENTRADA")]
    Income,
    /// Money leaving an account (`SAIDA`).
    #[serde(rename = "SAIDA")]
    Expense,
    /// Transfer between two accounts (`MOVIMENTACAO`).
    #[serde(rename = "MOVIMENTACAO")]
    Transfer,
    /// Credit card purchase (`CARTAO`).
    #[serde(rename = "CARTAO")]
    CreditCard,
}

impl TransactionType {
    /// All variants, in the order the forms list them.
    pub const ALL: [Self; 4] = [Self::Expense, Self::Income, Self::Transfer, Self::CreditCard];

    /// Returns the backend constant for this type.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "ENTRADA",
            Self::Expense => "SAIDA",
            Self::Transfer => "MOVIMENTACAO",
            Self::CreditCard => "CARTAO",
        }
    }

    /// Returns a short human-readable label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Transfer => "Transfer",
            Self::CreditCard => "Credit card",
        }
    }

    /// Whether the type debits a source account.
    #[inline]
    #[must_use]
    pub const fn requires_out_account(self) -> bool {
        matches!(self, Self::Expense | Self::Transfer | Self::CreditCard)
    }

    /// Whether the type credits a destination account.
    #[inline]
    #[must_use]
    pub const fn requires_in_account(self) -> bool {
        matches!(self, Self::Income | Self::Transfer)
    }
}

impl fmt::Display for TransactionType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown transaction type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction type: {0}")]
pub struct ParseTransactionTypeError(String);

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    /// Accepts the backend constants and their English names,
    /// case-insensitively.
    #[inline]
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENTRADA" | "INCOME" => Ok(Self::Income),
            "SAIDA" | "EXPENSE" => Ok(Self::Expense),
            "MOVIMENTACAO" | "TRANSFER" => Ok(Self::Transfer),
            "CARTAO" | "CREDIT-CARD" | "CREDIT_CARD" | "CARD" => Ok(Self::CreditCard),
            _ => Err(ParseTransactionTypeError(s.to_owned())),
        }
    }
}

/// A recorded transaction as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Description.
    pub name: String,
    /// Positive amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Calendar date of the transaction.
    pub creation_date: NaiveDate,
    /// Kind of transaction.
    pub transaction_type: TransactionType,
    /// Optional category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Source account (expenses, card purchases, transfers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_account: Option<Account>,
    /// Destination account (incomes, transfers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_account: Option<Account>,
    /// Number of installments of a credit card purchase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_installments: Option<u32>,
}

impl Transaction {
    /// Returns the name of the account the transaction is booked against,
    /// preferring the source account.
    #[inline]
    #[must_use]
    pub fn account_name(&self) -> Option<&str> {
        self.out_account
            .as_ref()
            .or(self.in_account.as_ref())
            .map(|acc| acc.name.as_str())
    }
}

/// Fields shared by every transaction variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    /// Description.
    pub name: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Calendar date.
    pub creation_date: NaiveDate,
    /// Optional category.
    pub category: Option<CategoryId>,
}

/// A validated transaction payload, one variant per transaction type.
///
/// Each variant carries exactly the account references its type requires,
/// so an expense without a source account cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInput {
    /// `ENTRADA`: credits `in_account`.
    Income {
        /// Shared fields.
        details: TransactionDetails,
        /// Destination account.
        in_account: AccountId,
    },
    /// `SAIDA`: debits `out_account`.
    Expense {
        /// Shared fields.
        details: TransactionDetails,
        /// Source account.
        out_account: AccountId,
    },
    /// `MOVIMENTACAO`: moves money from `out_account` to `in_account`.
    Transfer {
        /// Shared fields.
        details: TransactionDetails,
        /// Source account.
        out_account: AccountId,
        /// Destination account.
        in_account: AccountId,
    },
    /// `CARTAO`: card purchase debited from `out_account`.
    CreditCard {
        /// Shared fields.
        details: TransactionDetails,
        /// Card account.
        out_account: AccountId,
        /// Number of installments, if split.
        total_installments: Option<u32>,
    },
}

impl TransactionInput {
    /// Returns the transaction type of this variant.
    #[inline]
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        match *self {
            Self::Income { .. } => TransactionType::Income,
            Self::Expense { .. } => TransactionType::Expense,
            Self::Transfer { .. } => TransactionType::Transfer,
            Self::CreditCard { .. } => TransactionType::CreditCard,
        }
    }

    /// Returns the shared fields.
    #[inline]
    #[must_use]
    pub const fn details(&self) -> &TransactionDetails {
        match *self {
            Self::Income { ref details, .. }
            | Self::Expense { ref details, .. }
            | Self::Transfer { ref details, .. }
            | Self::CreditCard { ref details, .. } => details,
        }
    }

    /// Re-checks the fields a hand-built payload can still get wrong.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::Validation`] for a blank name, a
    /// non-positive amount, identical transfer accounts or zero
    /// installments.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let details = self.details();
        if details.name.trim().is_empty() {
            errors.push(FieldError::new(Field::Name, "name is required"));
        }
        if details.amount <= Decimal::ZERO {
            errors.push(FieldError::new(Field::Amount, "amount must be positive"));
        }
        match *self {
            Self::Transfer {
                out_account,
                in_account,
                ..
            } if out_account == in_account => errors.push(FieldError::new(
                Field::InAccount,
                "transfer accounts must differ",
            )),
            Self::CreditCard {
                total_installments: Some(0),
                ..
            } => errors.push(FieldError::new(
                Field::TotalInstallments,
                "installments must be at least 1",
            )),
            Self::Income { .. }
            | Self::Expense { .. }
            | Self::Transfer { .. }
            | Self::CreditCard { .. } => {}
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FinanceError::Validation(errors))
        }
    }

    /// Returns `(out_account, in_account)`.
    const fn accounts(&self) -> (Option<AccountId>, Option<AccountId>) {
        match *self {
            Self::Income { in_account, .. } => (None, Some(in_account)),
            Self::Expense { out_account, .. } | Self::CreditCard { out_account, .. } => {
                (Some(out_account), None)
            }
            Self::Transfer {
                out_account,
                in_account,
                ..
            } => (Some(out_account), Some(in_account)),
        }
    }
}

/// Wire shape of a transaction create/update request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPayload<'a> {
    /// Description.
    name: &'a str,
    /// Amount as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    /// Calendar date.
    creation_date: NaiveDate,
    /// Backend type constant.
    transaction_type: TransactionType,
    /// Category reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<CategoryRef>,
    /// Source account reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    out_account: Option<AccountRef>,
    /// Destination account reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    in_account: Option<AccountRef>,
    /// Installment count.
    #[serde(skip_serializing_if = "Option::is_none")]
    total_installments: Option<u32>,
}

impl Serialize for TransactionInput {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let details = self.details();
        let (out_account, in_account) = self.accounts();
        let total_installments = match *self {
            Self::CreditCard {
                total_installments, ..
            } => total_installments,
            Self::Income { .. } | Self::Expense { .. } | Self::Transfer { .. } => None,
        };
        TransactionPayload {
            name: &details.name,
            amount: details.amount,
            creation_date: details.creation_date,
            transaction_type: self.transaction_type(),
            category: details.category.map(|id| CategoryRef { id }),
            out_account: out_account.map(|id| AccountRef { id }),
            in_account: in_account.map(|id| AccountRef { id }),
            total_installments,
        }
        .serialize(serializer)
    }
}

/// Unvalidated transaction form state.
///
/// Every field is optional, mirroring a form being filled in. Call
/// [`TransactionDraft::validate`] to obtain a [`TransactionInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Description.
    pub name: String,
    /// Amount, if entered.
    pub amount: Option<Decimal>,
    /// Date, if entered.
    pub creation_date: Option<NaiveDate>,
    /// Selected type.
    pub transaction_type: TransactionType,
    /// Selected category.
    pub category: Option<CategoryId>,
    /// Selected source account.
    pub out_account: Option<AccountId>,
    /// Selected destination account.
    pub in_account: Option<AccountId>,
    /// Installment count.
    pub total_installments: Option<u32>,
}

impl Default for TransactionDraft {
    #[inline]
    fn default() -> Self {
        Self::new(TransactionType::Expense)
    }
}

impl TransactionDraft {
    /// Creates an empty draft of the given type.
    #[inline]
    #[must_use]
    pub const fn new(transaction_type: TransactionType) -> Self {
        Self {
            name: String::new(),
            amount: None,
            creation_date: None,
            transaction_type,
            category: None,
            out_account: None,
            in_account: None,
            total_installments: None,
        }
    }

    /// Pre-fills a draft from an existing transaction, for editing.
    #[inline]
    #[must_use]
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            name: tx.name.clone(),
            amount: Some(tx.amount),
            creation_date: Some(tx.creation_date),
            transaction_type: tx.transaction_type,
            category: tx.category.as_ref().map(|cat| cat.id),
            out_account: tx.out_account.as_ref().map(|acc| acc.id),
            in_account: tx.in_account.as_ref().map(|acc| acc.id),
            total_installments: tx.total_installments,
        }
    }

    /// Validates the draft and converts it to a typed payload.
    ///
    /// All problems are collected, not just the first one.
    ///
    /// # Errors
    ///
    /// Returns [`FinanceError::Validation`] listing every invalid field.
    #[inline]
    pub fn validate(&self) -> Result<TransactionInput> {
        let mut errors = Vec::new();
        let kind = self.transaction_type;

        if self.name.trim().is_empty() {
            errors.push(FieldError::new(Field::Name, "name is required"));
        }
        match self.amount {
            None => errors.push(FieldError::new(Field::Amount, "amount is required")),
            Some(amount) if amount <= Decimal::ZERO => {
                errors.push(FieldError::new(Field::Amount, "amount must be positive"));
            }
            Some(_) => {}
        }
        if self.creation_date.is_none() {
            errors.push(FieldError::new(Field::CreationDate, "date is required"));
        }
        if kind.requires_out_account() && self.out_account.is_none() {
            errors.push(FieldError::new(
                Field::OutAccount,
                format!("source account is required for {}", kind.label()),
            ));
        }
        if kind.requires_in_account() && self.in_account.is_none() {
            errors.push(FieldError::new(
                Field::InAccount,
                format!("destination account is required for {}", kind.label()),
            ));
        }
        if kind == TransactionType::Transfer
            && self.out_account.is_some()
            && self.out_account == self.in_account
        {
            errors.push(FieldError::new(
                Field::InAccount,
                "transfer accounts must differ",
            ));
        }
        match self.total_installments {
            Some(_) if kind != TransactionType::CreditCard => errors.push(FieldError::new(
                Field::TotalInstallments,
                "installments only apply to credit card purchases",
            )),
            Some(0) => errors.push(FieldError::new(
                Field::TotalInstallments,
                "installments must be at least 1",
            )),
            Some(_) | None => {}
        }

        let (Some(amount), Some(creation_date), true) =
            (self.amount, self.creation_date, errors.is_empty())
        else {
            return Err(FinanceError::Validation(errors));
        };
        let details = TransactionDetails {
            name: self.name.trim().to_owned(),
            amount,
            creation_date,
            category: self.category,
        };

        let input = match (kind, self.out_account, self.in_account) {
            (TransactionType::Income, _, Some(in_account)) => TransactionInput::Income {
                details,
                in_account,
            },
            (TransactionType::Expense, Some(out_account), _) => TransactionInput::Expense {
                details,
                out_account,
            },
            (TransactionType::Transfer, Some(out_account), Some(in_account)) => {
                TransactionInput::Transfer {
                    details,
                    out_account,
                    in_account,
                }
            }
            (TransactionType::CreditCard, Some(out_account), _) => TransactionInput::CreditCard {
                details,
                out_account,
                total_installments: self.total_installments,
            },
            (TransactionType::Income | TransactionType::Expense, _, _)
            | (TransactionType::Transfer | TransactionType::CreditCard, _, _) => {
                // Unreachable once the account checks above passed.
                return Err(FinanceError::Validation(errors));
            }
        };
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled(kind: TransactionType) -> TransactionDraft {
        TransactionDraft {
            name: "Mercado".to_owned(),
            amount: Some(Decimal::new(4590, 2)),
            creation_date: Some(date(2025, 1, 2)),
            category: Some(CategoryId::new(5)),
            ..TransactionDraft::new(kind)
        }
    }

    #[test]
    fn deserialize_expense() {
        let json = r#"{
            "id": 10,
            "name": "Aluguel",
            "amount": 1800.00,
            "creationDate": "2025-01-05",
            "transactionType": "SAIDA",
            "category": {"id": 2, "name": "Moradia"},
            "outAccount": {"id": 1, "name": "Nubank", "initialBalance": 0},
            "inAccount": null
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, TransactionId::new(10));
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.creation_date, date(2025, 1, 5));
        assert_eq!(tx.amount, Decimal::from(1800));
        assert_eq!(tx.account_name(), Some("Nubank"));
        assert!(tx.total_installments.is_none());
    }

    #[test]
    fn transaction_type_wire_names() {
        for (kind, wire) in [
            (TransactionType::Income, r#""ENTRADA""#),
            (TransactionType::Expense, r#""SAIDA""#),
            (TransactionType::Transfer, r#""MOVIMENTACAO""#),
            (TransactionType::CreditCard, r#""CARTAO""#),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), wire);
        }
        assert!(serde_json::from_str::<TransactionType>(r#""PIX""#).is_err());
    }

    #[test]
    fn transaction_type_parses_both_vocabularies() {
        assert_eq!("saida".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("card".parse::<TransactionType>().unwrap(), TransactionType::CreditCard);
        assert!("x".parse::<TransactionType>().is_err());
    }

    #[test]
    fn expense_without_out_account_is_rejected() {
        let draft = filled(TransactionType::Expense);
        let err = draft.validate().unwrap_err();
        let fields: Vec<Field> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::OutAccount]);
    }

    #[test]
    fn income_requires_in_account_only() {
        let mut draft = filled(TransactionType::Income);
        draft.in_account = Some(AccountId::new(1));
        let input = draft.validate().unwrap();
        assert_eq!(input.transaction_type(), TransactionType::Income);

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["transactionType"], "ENTRADA");
        assert_eq!(value["inAccount"]["id"], 1);
        assert!(value.get("outAccount").is_none());
        assert_eq!(value["category"]["id"], 5);
        assert_eq!(value["creationDate"], "2025-01-02");
        assert_eq!(value["amount"], 45.9);
    }

    #[test]
    fn transfer_requires_distinct_accounts() {
        let mut draft = filled(TransactionType::Transfer);
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field_errors().len(), 2);

        draft.out_account = Some(AccountId::new(1));
        draft.in_account = Some(AccountId::new(1));
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, Field::InAccount);

        draft.in_account = Some(AccountId::new(2));
        let value = serde_json::to_value(draft.validate().unwrap()).unwrap();
        assert_eq!(value["outAccount"]["id"], 1);
        assert_eq!(value["inAccount"]["id"], 2);
    }

    #[test]
    fn installments_only_for_credit_card() {
        let mut draft = filled(TransactionType::Expense);
        draft.out_account = Some(AccountId::new(1));
        draft.total_installments = Some(3);
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field_errors()[0].field, Field::TotalInstallments);

        draft.transaction_type = TransactionType::CreditCard;
        let value = serde_json::to_value(draft.validate().unwrap()).unwrap();
        assert_eq!(value["transactionType"], "CARTAO");
        assert_eq!(value["totalInstallments"], 3);

        draft.total_installments = Some(0);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let err = TransactionDraft::default().validate().unwrap_err();
        let fields: Vec<Field> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![Field::Name, Field::Amount, Field::CreationDate, Field::OutAccount]
        );
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let mut draft = filled(TransactionType::Expense);
        draft.out_account = Some(AccountId::new(1));
        draft.amount = Some(Decimal::ZERO);
        assert_eq!(draft.validate().unwrap_err().field_errors()[0].field, Field::Amount);
    }

    #[test]
    fn draft_from_transaction_roundtrips_references() {
        let json = r#"{
            "id": 11,
            "name": "Salário",
            "amount": 5000,
            "creationDate": "2025-01-01",
            "transactionType": "ENTRADA",
            "inAccount": {"id": 4, "name": "Itaú", "initialBalance": 0}
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        let draft = TransactionDraft::from_transaction(&tx);
        assert_eq!(draft.in_account, Some(AccountId::new(4)));
        assert!(draft.out_account.is_none());
        assert!(draft.validate().is_ok());
    }
}
