//! Newtype wrappers for entity identifiers.
//!
//! The backend keys every entity by a numeric `Long`; wrapping them keeps
//! an account id from being passed where a category id is expected.

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapping an `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier from the given value.
            #[inline]
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Consumes the wrapper and returns the inner value.
            #[inline]
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

define_id! {
    /// Unique identifier for an account.
    AccountId
}

define_id! {
    /// Unique identifier for a category.
    CategoryId
}

define_id! {
    /// Unique identifier for a transaction.
    TransactionId
}

define_id! {
    /// Unique identifier for a monthly planning entry.
    PlanningId
}
