//! Rust client library for a personal-finance tracking REST API.
//!
//! This crate provides typed models, async and blocking HTTP clients, a
//! token-backed session, client-side list state and the derived views
//! (cumulative chart, filters, pagination, selection) used by the
//! `fintrack` terminal front end.
//!
//! ```rust,no_run
//! # #[cfg(feature = "blocking")]
//! # fn demo() -> fintrack_rs::Result<()> {
//! use std::sync::Arc;
//!
//! use fintrack_rs::auth::BlockingAuthSession;
//! use fintrack_rs::client::FinanceBlockingClient;
//! use fintrack_rs::credentials::InMemoryTokenStore;
//! use secrecy::SecretString;
//!
//! let store = Arc::new(InMemoryTokenStore::new());
//! let mut session = BlockingAuthSession::new(FinanceBlockingClient::builder(), store)?;
//! session.restore()?;
//! session.login("ana@example.com", &SecretString::from("s3cret".to_owned()))?;
//! for account in session.client().accounts()? {
//!     println!("{}: {}", account.name, account.balance());
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod auth;
pub mod chart;
pub mod claims;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod collection;
pub mod credentials;
pub mod error;
pub mod filters;
pub mod format;
pub mod models;
pub mod resource;
pub mod selection;

pub use error::{FinanceError, Result};
