//! Decoding of the claims embedded in the bearer token.
//!
//! The payload is read for display only; the signature is never verified
//! on the client.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{FinanceError, Result};
use crate::models::User;

/// Claims carried in the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Issued-at, seconds since the epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry, seconds since the epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// Expiry as a timestamp, if the token carries one.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0_u32))
    }

    /// Whether the token expired before `now`. Tokens without `exp` never
    /// expire.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// The user identified by these claims.
    #[inline]
    #[must_use]
    pub fn user(&self) -> User {
        User {
            email: self.sub.clone(),
            name: self.name.clone(),
        }
    }
}

/// Decodes the payload segment of a JWT.
///
/// # Errors
///
/// Returns [`FinanceError::InvalidToken`] if the token does not have three
/// dot-separated segments, the payload is not base64url, or the JSON lacks
/// a `sub` claim.
#[inline]
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(FinanceError::InvalidToken(
            "expected three dot-separated segments".to_owned(),
        ));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| FinanceError::InvalidToken(format!("payload is not base64url: {err}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| FinanceError::InvalidToken(format!("malformed claims: {err}")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds an unsigned token carrying `payload`.
    pub(crate) fn make_token(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decode_full_claims() {
        let token = make_token(&serde_json::json!({
            "sub": "ana@example.com",
            "name": "Ana",
            "iat": 1_700_000_000_i64,
            "exp": 1_700_086_400_i64
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.name.as_deref(), Some("Ana"));
        assert_eq!(claims.user().display_name(), "Ana");
    }

    #[test]
    fn decode_without_name() {
        let token = make_token(&serde_json::json!({"sub": "bob@example.com"}));
        let claims = decode_claims(&token).unwrap();
        assert!(claims.name.is_none());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn reject_wrong_segment_count() {
        assert!(matches!(
            decode_claims("only.two"),
            Err(FinanceError::InvalidToken(_))
        ));
        assert!(matches!(
            decode_claims("a.b.c.d"),
            Err(FinanceError::InvalidToken(_))
        ));
    }

    #[test]
    fn reject_garbage_payload() {
        assert!(matches!(
            decode_claims("x.!!!.y"),
            Err(FinanceError::InvalidToken(_))
        ));
        let not_json = format!("x.{}.y", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(
            decode_claims(&not_json),
            Err(FinanceError::InvalidToken(_))
        ));
    }

    #[test]
    fn expiry_check() {
        let token = make_token(&serde_json::json!({"sub": "a", "exp": 100_i64}));
        let claims = decode_claims(&token).unwrap();
        let before = DateTime::from_timestamp(99, 0).unwrap();
        let after = DateTime::from_timestamp(101, 0).unwrap();
        assert!(!claims.is_expired(before));
        assert!(claims.is_expired(after));
    }
}
