//! Data models for the finance API entities.
//!
//! This module contains strongly-typed representations of the backend's
//! JSON records, newtype ID wrappers, typed create/update payloads and the
//! client-side validation that runs before a payload is sent.

mod account;
pub(crate) mod auth;
mod category;
mod dashboard;
mod ids;
mod page;
mod planning;
mod transaction;
mod user;

pub use account::{Account, AccountInput};
pub use category::{Category, CategoryInput};
pub use chrono::NaiveDate;
pub use dashboard::{DashboardSummary, MonthSummary};
pub use ids::{AccountId, CategoryId, PlanningId, TransactionId};
pub(crate) use page::Listing;
pub use page::Page;
pub use planning::{PlanningEntry, PlanningInput};
pub use rust_decimal::Decimal;
pub use transaction::{
    ParseTransactionTypeError, Transaction, TransactionDetails, TransactionDraft,
    TransactionInput, TransactionType,
};
pub use user::{ProfileUpdate, User, UserProfile};
