//! Wire payloads of the authentication and account-security endpoints.

use serde::{Deserialize, Serialize};

/// `POST /auth/login` and `POST /auth/register` body.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    /// Display name, registration only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<&'a str>,
    /// Login email.
    pub(crate) email: &'a str,
    /// Plain password, exposed only while serializing.
    pub(crate) password: &'a str,
}

/// `POST /auth/login` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    /// Issued bearer token.
    pub(crate) token: String,
}

/// `POST /auth/forgot-password` body.
#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    /// Account email.
    pub(crate) email: &'a str,
}

/// `POST /auth/reset-password` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest<'a> {
    /// Reset token received by email.
    pub(crate) token: &'a str,
    /// New password.
    pub(crate) new_password: &'a str,
}

/// `POST /users/change-password` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest<'a> {
    /// Current password.
    pub(crate) current_password: &'a str,
    /// New password.
    pub(crate) new_password: &'a str,
}

/// `PUT /users/me` body.
#[derive(Debug, Serialize)]
pub(crate) struct ProfileRequest<'a> {
    /// New display name.
    pub(crate) name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_body_omits_name() {
        let body = CredentialsRequest {
            name: None,
            email: "ana@example.com",
            password: "s3cret",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("name").is_none());
        assert_eq!(value["email"], "ana@example.com");
    }

    #[test]
    fn password_bodies_use_camel_case() {
        let reset = serde_json::to_value(ResetPasswordRequest {
            token: "t",
            new_password: "n",
        })
        .unwrap();
        assert_eq!(reset["newPassword"], "n");

        let change = serde_json::to_value(ChangePasswordRequest {
            current_password: "c",
            new_password: "n",
        })
        .unwrap();
        assert_eq!(change["currentPassword"], "c");
    }
}
