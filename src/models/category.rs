//! Transaction category model.

use serde::{Deserialize, Serialize};

use super::CategoryId;
use crate::error::{Field, FieldError, FinanceError, Result};

/// A category used to classify transactions and planning entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Payload for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    /// Display name.
    pub name: String,
}

impl CategoryInput {
    /// Creates a category payload.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self { name: name.into() }
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
                "category name is required",
            )]));
        }
        Ok(())
    }
}

/// Reference to a category inside another payload (`{"id": 1}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct CategoryRef {
    /// Referenced category.
    pub(crate) id: CategoryId,
}
