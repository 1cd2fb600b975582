//! The [`Resource`] trait ties an entity to its REST collection.

use core::fmt::Display;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::{
    Account, AccountId, AccountInput, Category, CategoryId, CategoryInput, PlanningEntry,
    PlanningId, PlanningInput, Transaction, TransactionId, TransactionInput,
};

/// An entity served by a REST collection with the usual
/// list/create/update/delete endpoints and `POST {PATH}/delete-multiple`.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Collection path relative to the API base, with a leading slash.
    const PATH: &'static str;
    /// Singular noun used in prompts and logs.
    const NAME: &'static str;

    /// Identifier type.
    type Id: Copy + Eq + Display + Serialize + Send + Sync;
    /// Create/update payload.
    type Input: Serialize + Send + Sync;

    /// Identifier of this record.
    fn id(&self) -> Self::Id;

    /// Checks a payload before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FinanceError::Validation`] for invalid input.
    fn validate(input: &Self::Input) -> Result<()>;
}

impl Resource for Account {
    const PATH: &'static str = "/accounts";
    const NAME: &'static str = "account";
    type Id = AccountId;
    type Input = AccountInput;

    #[inline]
    fn id(&self) -> AccountId {
        self.id
    }

    #[inline]
    fn validate(input: &AccountInput) -> Result<()> {
        input.validate()
    }
}

impl Resource for Category {
    const PATH: &'static str = "/categories";
    const NAME: &'static str = "category";
    type Id = CategoryId;
    type Input = CategoryInput;

    #[inline]
    fn id(&self) -> CategoryId {
        self.id
    }

    #[inline]
    fn validate(input: &CategoryInput) -> Result<()> {
        input.validate()
    }
}

impl Resource for Transaction {
    const PATH: &'static str = "/transactions";
    const NAME: &'static str = "transaction";
    type Id = TransactionId;
    type Input = TransactionInput;

    #[inline]
    fn id(&self) -> TransactionId {
        self.id
    }

    #[inline]
    fn validate(input: &TransactionInput) -> Result<()> {
        input.validate()
    }
}

impl Resource for PlanningEntry {
    const PATH: &'static str = "/monthly-planning";
    const NAME: &'static str = "planning entry";
    type Id = PlanningId;
    type Input = PlanningInput;

    #[inline]
    fn id(&self) -> PlanningId {
        self.id
    }

    #[inline]
    fn validate(input: &PlanningInput) -> Result<()> {
        input.validate()
    }
}
