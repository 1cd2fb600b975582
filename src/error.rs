//! Error types for the finance client library.

use core::fmt;

/// Form field that failed client-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Field {
    /// Entity or transaction name.
    Name,
    /// Transaction amount.
    Amount,
    /// Transaction date.
    CreationDate,
    /// Source account of an expense, card purchase or transfer.
    OutAccount,
    /// Destination account of an income or transfer.
    InAccount,
    /// Number of card installments.
    TotalInstallments,
    /// Planning month.
    Month,
    /// Planning year.
    Year,
    /// Planned amount.
    EstimatedAmount,
    /// Account opening balance.
    InitialBalance,
    /// Login or registration email.
    Email,
    /// Login, registration or new password.
    Password,
}

impl Field {
    /// Returns the wire (JSON) name of the field.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Amount => "amount",
            Self::CreationDate => "creationDate",
            Self::OutAccount => "outAccount",
            Self::InAccount => "inAccount",
            Self::TotalInstallments => "totalInstallments",
            Self::Month => "month",
            Self::Year => "year",
            Self::EstimatedAmount => "estimatedAmount",
            Self::InitialBalance => "initialBalance",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for Field {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single client-side validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Offending field.
    pub field: Field,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[inline]
    #[must_use]
    pub fn new<M: Into<String>>(field: Field, message: M) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Joins field errors for the [`FinanceError::Validation`] message.
fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// All errors that can occur when using the finance client.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FinanceError {
    /// HTTP transport failed before a response was received.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API base URL could not be parsed or joined.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client-side form validation rejected the input.
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// The operation requires a signed-in user.
    #[error("not authenticated")]
    Unauthenticated,

    /// The bearer token could not be decoded.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token storage backend failed.
    #[error("token storage error: {0}")]
    TokenStorage(Box<dyn core::error::Error + Send + Sync>),
}

impl FinanceError {
    /// Returns the HTTP status when the backend rejected the request.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match *self {
            Self::Api { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Returns `true` for 401/403 responses and missing sessions.
    #[inline]
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            *self,
            Self::Unauthenticated
                | Self::Api {
                    status: 401 | 403,
                    ..
                }
        )
    }

    /// Returns `true` for 404 responses.
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(*self, Self::Api { status: 404, .. })
    }

    /// Returns the field errors of a validation failure, if any.
    #[inline]
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match *self {
            Self::Validation(ref errors) => errors,
            _ => &[],
        }
    }

    /// Returns a short message suitable for inline display next to the
    /// action that failed.
    #[inline]
    #[must_use]
    pub fn user_message(&self) -> String {
        match *self {
            Self::Api { ref message, .. } => message.clone(),
            Self::Validation(ref errors) => join_field_errors(errors),
            Self::Unauthenticated => "please sign in first".to_owned(),
            _ => self.to_string(),
        }
    }
}

/// Convenience alias for results using [`FinanceError`].
pub type Result<T> = core::result::Result<T, FinanceError>;
