//! Authenticated user models.

use serde::{Deserialize, Serialize};

/// The signed-in user, as decoded from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login email (the token subject).
    pub email: String,
    /// Display name, when the token carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    /// Returns the display name, falling back to the email.
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Returns up to two uppercase initials for avatars and prompts.
    #[inline]
    #[must_use]
    pub fn initials(&self) -> String {
        self.display_name()
            .split(|c: char| c.is_whitespace() || c == '@' || c == '.')
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// User record returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response of `PUT /users/me`: the updated profile and a fresh token
/// carrying the new claims.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    /// Updated profile.
    pub user: UserProfile,
    /// Replacement bearer token.
    pub token: String,
}
