//! HTTP client for the finance REST API.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Each variant attaches `Authorization: Bearer <token>` whenever its
//! [`CredentialProvider`](crate::credentials::CredentialProvider) has a
//! token, and maps non-success responses to [`FinanceError::Api`].

use reqwest::StatusCode;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use url::Url;

use crate::error::{Field, FieldError, FinanceError, Result};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Login endpoint path.
const LOGIN_PATH: &str = "/auth/login";
/// Registration endpoint path.
const REGISTER_PATH: &str = "/auth/register";
/// Password-reset request endpoint path.
const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
/// Password-reset confirmation endpoint path.
const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
/// Profile endpoint path.
const PROFILE_PATH: &str = "/users/me";
/// Password-change endpoint path.
const CHANGE_PASSWORD_PATH: &str = "/users/change-password";
/// Dashboard summary endpoint path.
const DASHBOARD_SUMMARY_PATH: &str = "/dashboard/summary";
/// Dashboard transactions endpoint path.
const DASHBOARD_TRANSACTIONS_PATH: &str = "/dashboard/transactions";
/// Transaction spreadsheet export path.
const EXPORT_PATH: &str = "/transactions/export";
/// Transaction spreadsheet import path.
const IMPORT_PATH: &str = "/transactions/import";

/// Error body produced by the backend's exception handler.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    message: Option<String>,
}

/// Picks the message shown for a failed request: the JSON `message` field,
/// else the raw body, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        })
}

/// Joins `path` onto the base URL and appends the query parameters.
fn build_url(base_url: &str, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
    let raw = format!("{base_url}{path}");
    let url = if params.is_empty() {
        Url::parse(&raw)?
    } else {
        Url::parse_with_params(&raw, params)?
    };
    Ok(url)
}

/// Generates a finance client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        response_type: $resp_type:ty,
        form_type: $form_type:ty,
        part_type: $part_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Source of the bearer token.
            credentials: Option<Arc<dyn CredentialProvider>>,
            /// Base URL override.
            base_url: Option<String>,
        }

        impl $builder {
            /// Sets the provider consulted for a bearer token before every
            /// request.
            #[inline]
            #[must_use]
            pub fn credentials<P: CredentialProvider + 'static>(mut self, provider: Arc<P>) -> Self {
                self.credentials = Some(provider);
                self
            }

            /// Overrides the base URL (e.g. a deployed backend or a mock
            /// server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Url`] if the base URL is not a valid
            /// absolute URL.
            /// Returns [`FinanceError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
                    .trim_end_matches('/')
                    .to_owned();
                let _parsed = Url::parse(&base_url)?;
                tracing::debug!(base_url = %base_url, "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    base_url,
                    credentials: self.credentials,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug, Clone)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// API base URL without a trailing slash.
            base_url: String,
            /// Source of the bearer token.
            credentials: Option<Arc<dyn CredentialProvider>>,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    credentials: None,
                    base_url: None,
                }
            }

            /// The API base URL.
            #[inline]
            #[must_use]
            pub fn base_url(&self) -> &str {
                &self.base_url
            }

            // ── Generic resource operations ─────────────────────────

            /// Lists a collection, accepting both paginated and plain
            /// array responses.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH))]
            pub $($async_kw)? fn list<R: Resource>(
                &self,
                params: &[(&'static str, String)],
            ) -> Result<Page<R>> {
                let url = self.url(R::PATH, params)?;
                let listing: Listing<R> = self
                    .json(self.request(Method::GET, url))
                    $( .$await_ext )?
                    ?;
                Ok(listing.into_page())
            }

            /// Fetches a single record.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, id = %id))]
            pub $($async_kw)? fn get<R: Resource>(&self, id: R::Id) -> Result<R> {
                let url = self.url(&format!("{}/{id}", R::PATH), &[])?;
                self.json(self.request(Method::GET, url)) $( .$await_ext )?
            }

            /// Validates `input` and creates a record.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] before any request if the
            /// input is invalid, otherwise any HTTP or deserialization error.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH))]
            pub $($async_kw)? fn create<R: Resource>(&self, input: &R::Input) -> Result<R> {
                R::validate(input)?;
                let url = self.url(R::PATH, &[])?;
                self.json(self.request(Method::POST, url).json(input)) $( .$await_ext )?
            }

            /// Validates `input` and replaces the record with id `id`.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] before any request if the
            /// input is invalid, otherwise any HTTP or deserialization error.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, id = %id))]
            pub $($async_kw)? fn update<R: Resource>(
                &self,
                id: R::Id,
                input: &R::Input,
            ) -> Result<R> {
                R::validate(input)?;
                let url = self.url(&format!("{}/{id}", R::PATH), &[])?;
                self.json(self.request(Method::PUT, url).json(input)) $( .$await_ext )?
            }

            /// Deletes the record with id `id`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status (e.g. 404, or a conflict when the record is
            /// still referenced).
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, id = %id))]
            pub $($async_kw)? fn delete<R: Resource>(&self, id: R::Id) -> Result<()> {
                let url = self.url(&format!("{}/{id}", R::PATH), &[])?;
                self.execute(self.request(Method::DELETE, url)) $( .$await_ext )?
            }

            /// Deletes several records in one request.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, count = ids.len()))]
            pub $($async_kw)? fn delete_many<R: Resource>(&self, ids: &[R::Id]) -> Result<()> {
                let url = self.url(&format!("{}/delete-multiple", R::PATH), &[])?;
                self.execute(self.request(Method::POST, url).json(ids)) $( .$await_ext )?
            }

            // ── Accounts ────────────────────────────────────────────

            /// Lists every account.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            pub $($async_kw)? fn accounts(&self) -> Result<Vec<Account>> {
                Ok(self.list::<Account>(&[]) $( .$await_ext )? ?.content)
            }

            /// Creates an account.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for a blank name, otherwise
            /// any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn create_account(&self, input: &AccountInput) -> Result<Account> {
                self.create::<Account>(input) $( .$await_ext )?
            }

            /// Updates an account.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for a blank name, otherwise
            /// any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn update_account(
                &self,
                id: AccountId,
                input: &AccountInput,
            ) -> Result<Account> {
                self.update::<Account>(id, input) $( .$await_ext )?
            }

            /// Deletes an account.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_account(&self, id: AccountId) -> Result<()> {
                self.delete::<Account>(id) $( .$await_ext )?
            }

            // ── Categories ──────────────────────────────────────────

            /// Lists every category.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            pub $($async_kw)? fn categories(&self) -> Result<Vec<Category>> {
                Ok(self.list::<Category>(&[]) $( .$await_ext )? ?.content)
            }

            /// Creates a category.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for a blank name, otherwise
            /// any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn create_category(&self, input: &CategoryInput) -> Result<Category> {
                self.create::<Category>(input) $( .$await_ext )?
            }

            /// Renames a category.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for a blank name, otherwise
            /// any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn update_category(
                &self,
                id: CategoryId,
                input: &CategoryInput,
            ) -> Result<Category> {
                self.update::<Category>(id, input) $( .$await_ext )?
            }

            /// Deletes a category.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_category(&self, id: CategoryId) -> Result<()> {
                self.delete::<Category>(id) $( .$await_ext )?
            }

            /// Deletes several categories.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_categories(&self, ids: &[CategoryId]) -> Result<()> {
                self.delete_many::<Category>(ids) $( .$await_ext )?
            }

            // ── Transactions ────────────────────────────────────────

            /// Lists transactions matching `query`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            pub $($async_kw)? fn transactions(
                &self,
                query: &TransactionQuery,
            ) -> Result<Page<Transaction>> {
                self.list::<Transaction>(&query.params()) $( .$await_ext )?
            }

            /// Creates a transaction.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an invalid payload,
            /// otherwise any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn create_transaction(
                &self,
                input: &TransactionInput,
            ) -> Result<Transaction> {
                self.create::<Transaction>(input) $( .$await_ext )?
            }

            /// Updates a transaction.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an invalid payload,
            /// otherwise any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn update_transaction(
                &self,
                id: TransactionId,
                input: &TransactionInput,
            ) -> Result<Transaction> {
                self.update::<Transaction>(id, input) $( .$await_ext )?
            }

            /// Deletes a transaction.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_transaction(&self, id: TransactionId) -> Result<()> {
                self.delete::<Transaction>(id) $( .$await_ext )?
            }

            /// Deletes several transactions.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_transactions(&self, ids: &[TransactionId]) -> Result<()> {
                self.delete_many::<Transaction>(ids) $( .$await_ext )?
            }

            /// Downloads the transactions matching `filters` as a spreadsheet.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn export_transactions(
                &self,
                filters: &TransactionFilters,
            ) -> Result<Vec<u8>> {
                let url = self.url(EXPORT_PATH, &filters.params())?;
                let response = self.send(self.request(Method::GET, url)) $( .$await_ext )? ?;
                let bytes = response.bytes() $( .$await_ext )? ?;
                tracing::debug!(len = bytes.len(), "downloaded export");
                Ok(bytes.to_vec())
            }

            /// Uploads a spreadsheet of transactions as multipart field `file`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server rejects
            /// the file.
            #[inline]
            #[tracing::instrument(skip_all, fields(file_name = %file_name, len = contents.len()))]
            pub $($async_kw)? fn import_transactions(
                &self,
                file_name: &str,
                contents: Vec<u8>,
            ) -> Result<()> {
                let url = self.url(IMPORT_PATH, &[])?;
                let part = <$part_type>::bytes(contents).file_name(file_name.to_owned());
                let form = <$form_type>::new().part("file", part);
                self.execute(self.request(Method::POST, url).multipart(form)) $( .$await_ext )?
            }

            // ── Monthly planning ────────────────────────────────────

            /// Lists planning entries matching `query`.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            pub $($async_kw)? fn planning(
                &self,
                query: &PlanningQuery,
            ) -> Result<Page<PlanningEntry>> {
                self.list::<PlanningEntry>(&query.params()) $( .$await_ext )?
            }

            /// Fetches one planning entry.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            pub $($async_kw)? fn planning_entry(&self, id: PlanningId) -> Result<PlanningEntry> {
                self.get::<PlanningEntry>(id) $( .$await_ext )?
            }

            /// Creates a planning entry.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an out-of-range month or
            /// negative estimate, otherwise any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn create_planning(
                &self,
                input: &PlanningInput,
            ) -> Result<PlanningEntry> {
                self.create::<PlanningEntry>(input) $( .$await_ext )?
            }

            /// Updates a planning entry.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an out-of-range month or
            /// negative estimate, otherwise any HTTP or deserialization error.
            #[inline]
            pub $($async_kw)? fn update_planning(
                &self,
                id: PlanningId,
                input: &PlanningInput,
            ) -> Result<PlanningEntry> {
                self.update::<PlanningEntry>(id, input) $( .$await_ext )?
            }

            /// Deletes a planning entry.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_planning(&self, id: PlanningId) -> Result<()> {
                self.delete::<PlanningEntry>(id) $( .$await_ext )?
            }

            /// Deletes several planning entries.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            pub $($async_kw)? fn delete_plannings(&self, ids: &[PlanningId]) -> Result<()> {
                self.delete_many::<PlanningEntry>(ids) $( .$await_ext )?
            }

            // ── Dashboard ───────────────────────────────────────────

            /// Fetches previous/current/next month summaries.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn dashboard_summary(&self) -> Result<DashboardSummary> {
                let url = self.url(DASHBOARD_SUMMARY_PATH, &[])?;
                self.json(self.request(Method::GET, url)) $( .$await_ext )?
            }

            /// Fetches the transactions shown on the dashboard.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn dashboard_transactions(&self) -> Result<Vec<Transaction>> {
                let url = self.url(DASHBOARD_TRANSACTIONS_PATH, &[])?;
                let listing: Listing<Transaction> = self
                    .json(self.request(Method::GET, url))
                    $( .$await_ext )?
                    ?;
                Ok(listing.into_page().content)
            }

            // ── Authentication & profile ────────────────────────────

            /// Exchanges credentials for a bearer token.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an empty email or
            /// password, [`FinanceError::Api`] (usually 401) for rejected
            /// credentials, or any HTTP or deserialization error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn login(
                &self,
                email: &str,
                password: &SecretString,
            ) -> Result<SecretString> {
                validate_credentials(email, password)?;
                let url = self.url(LOGIN_PATH, &[])?;
                let body = CredentialsRequest {
                    name: None,
                    email: email.trim(),
                    password: password.expose_secret(),
                };
                let response: TokenResponse = self
                    .json(self.request(Method::POST, url).json(&body))
                    $( .$await_ext )?
                    ?;
                Ok(SecretString::from(response.token))
            }

            /// Creates a user account.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an empty email or
            /// password, otherwise any HTTP error (e.g. email already taken).
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn register(
                &self,
                name: Option<&str>,
                email: &str,
                password: &SecretString,
            ) -> Result<()> {
                validate_credentials(email, password)?;
                let url = self.url(REGISTER_PATH, &[])?;
                let body = CredentialsRequest {
                    name: name.map(str::trim).filter(|name| !name.is_empty()),
                    email: email.trim(),
                    password: password.expose_secret(),
                };
                self.execute(self.request(Method::POST, url).json(&body)) $( .$await_ext )?
            }

            /// Requests a password-reset email.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn forgot_password(&self, email: &str) -> Result<()> {
                let url = self.url(FORGOT_PASSWORD_PATH, &[])?;
                let body = ForgotPasswordRequest { email: email.trim() };
                self.execute(self.request(Method::POST, url).json(&body)) $( .$await_ext )?
            }

            /// Sets a new password using the token from the reset email.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server rejects
            /// the token.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn reset_password(
                &self,
                token: &str,
                new_password: &SecretString,
            ) -> Result<()> {
                let url = self.url(RESET_PASSWORD_PATH, &[])?;
                let body = ResetPasswordRequest {
                    token: token.trim(),
                    new_password: new_password.expose_secret(),
                };
                self.execute(self.request(Method::POST, url).json(&body)) $( .$await_ext )?
            }

            /// Changes the signed-in user's display name.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for a blank name, otherwise
            /// any HTTP or deserialization error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn update_profile(&self, name: &str) -> Result<ProfileUpdate> {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(FinanceError::Validation(vec![FieldError::new(
                        Field::Name,
                        "name is required",
                    )]));
                }
                let url = self.url(PROFILE_PATH, &[])?;
                let body = ProfileRequest { name: trimmed };
                self.json(self.request(Method::PUT, url).json(&body)) $( .$await_ext )?
            }

            /// Changes the signed-in user's password.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for an empty new password,
            /// otherwise any HTTP error (e.g. wrong current password).
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn change_password(
                &self,
                current_password: &SecretString,
                new_password: &SecretString,
            ) -> Result<()> {
                if new_password.expose_secret().is_empty() {
                    return Err(FinanceError::Validation(vec![FieldError::new(
                        Field::Password,
                        "new password is required",
                    )]));
                }
                let url = self.url(CHANGE_PASSWORD_PATH, &[])?;
                let body = ChangePasswordRequest {
                    current_password: current_password.expose_secret(),
                    new_password: new_password.expose_secret(),
                };
                self.execute(self.request(Method::POST, url).json(&body)) $( .$await_ext )?
            }

            // ── Private helpers ─────────────────────────────────────

            /// Builds the URL for `path` under the base URL.
            fn url(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
                build_url(&self.base_url, path, params)
            }

            /// Starts a request, attaching the bearer token when available.
            fn request(&self, method: Method, url: Url) -> $req_type {
                tracing::trace!(method = %method, url = %url, "preparing request");
                let builder = self.http.request(method, url);
                match self.credentials.as_ref().and_then(|provider| provider.token()) {
                    Some(token) => builder.bearer_auth(token.expose_secret()),
                    None => builder,
                }
            }

            /// Sends a request and turns non-success statuses into
            /// [`FinanceError::Api`].
            $($async_kw)? fn send(&self, builder: $req_type) -> Result<$resp_type> {
                let response: $resp_type = builder.send() $( .$await_ext )? ?;
                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    return Ok(response);
                }
                let body = response.text() $( .$await_ext )? .unwrap_or_default();
                let message = error_message(status, &body);
                tracing::debug!(status = status.as_u16(), message = %message, "API error");
                Err(FinanceError::Api {
                    status: status.as_u16(),
                    message,
                })
            }

            /// Sends a request and deserializes the JSON response body.
            $($async_kw)? fn json<Resp: DeserializeOwned>(&self, builder: $req_type) -> Result<Resp> {
                let response = self.send(builder) $( .$await_ext )? ?;
                let body = response.text() $( .$await_ext )? ?;
                tracing::trace!(body_len = body.len(), "parsing response body");
                serde_json::from_str(&body).map_err(FinanceError::from)
            }

            /// Sends a request whose response body is not needed.
            $($async_kw)? fn execute(&self, builder: $req_type) -> Result<()> {
                let _response = self.send(builder) $( .$await_ext )? ?;
                Ok(())
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the finance API.

    use std::sync::Arc;

    use reqwest::Method;
    use secrecy::{ExposeSecret as _, SecretString};
    use serde::de::DeserializeOwned;
    use url::Url;

    use super::{
        CHANGE_PASSWORD_PATH, DASHBOARD_SUMMARY_PATH, DASHBOARD_TRANSACTIONS_PATH,
        DEFAULT_BASE_URL, EXPORT_PATH, FORGOT_PASSWORD_PATH, IMPORT_PATH, LOGIN_PATH,
        PROFILE_PATH, REGISTER_PATH, RESET_PASSWORD_PATH, build_url, error_message,
        validate_credentials,
    };
    use crate::credentials::CredentialProvider;
    use crate::error::{Field, FieldError, FinanceError, Result};
    use crate::filters::{PlanningQuery, TransactionFilters, TransactionQuery};
    use crate::models::auth::{
        ChangePasswordRequest, CredentialsRequest, ForgotPasswordRequest, ProfileRequest,
        ResetPasswordRequest, TokenResponse,
    };
    use crate::models::{
        Account, AccountId, AccountInput, Category, CategoryId, CategoryInput, DashboardSummary,
        Listing, Page, PlanningEntry, PlanningId, PlanningInput, ProfileUpdate, Transaction,
        TransactionId, TransactionInput,
    };
    use crate::resource::Resource;

    define_client! {
        client_name: FinanceClient,
        builder_name: FinanceClientBuilder,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        response_type: reqwest::Response,
        form_type: reqwest::multipart::Form,
        part_type: reqwest::multipart::Part,
        client_doc: "Async client for the finance API.\n\nUse [`FinanceClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinanceClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the finance API.

    use std::sync::Arc;

    use reqwest::Method;
    use secrecy::{ExposeSecret as _, SecretString};
    use serde::de::DeserializeOwned;
    use url::Url;

    use super::{
        CHANGE_PASSWORD_PATH, DASHBOARD_SUMMARY_PATH, DASHBOARD_TRANSACTIONS_PATH,
        DEFAULT_BASE_URL, EXPORT_PATH, FORGOT_PASSWORD_PATH, IMPORT_PATH, LOGIN_PATH,
        PROFILE_PATH, REGISTER_PATH, RESET_PASSWORD_PATH, build_url, error_message,
        validate_credentials,
    };
    use crate::credentials::CredentialProvider;
    use crate::error::{Field, FieldError, FinanceError, Result};
    use crate::filters::{PlanningQuery, TransactionFilters, TransactionQuery};
    use crate::models::auth::{
        ChangePasswordRequest, CredentialsRequest, ForgotPasswordRequest, ProfileRequest,
        ResetPasswordRequest, TokenResponse,
    };
    use crate::models::{
        Account, AccountId, AccountInput, Category, CategoryId, CategoryInput, DashboardSummary,
        Listing, Page, PlanningEntry, PlanningId, PlanningInput, ProfileUpdate, Transaction,
        TransactionId, TransactionInput,
    };
    use crate::resource::Resource;

    define_client! {
        client_name: FinanceBlockingClient,
        builder_name: FinanceBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        response_type: reqwest::blocking::Response,
        form_type: reqwest::blocking::multipart::Form,
        part_type: reqwest::blocking::multipart::Part,
        client_doc: "Blocking (synchronous) client for the finance API.\n\nUse [`FinanceBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinanceBlockingClient`].",
    }
}

/// Rejects an empty email or password before contacting the backend.
fn validate_credentials(email: &str, password: &SecretString) -> Result<()> {
    let mut errors = Vec::new();
    if email.trim().is_empty() {
        errors.push(FieldError::new(Field::Email, "email is required"));
    }
    if password.expose_secret().is_empty() {
        errors.push(FieldError::new(Field::Password, "password is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FinanceError::Validation(errors))
    }
}

#[cfg(feature = "async")]
pub use async_client::{FinanceClient, FinanceClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{FinanceBlockingClient, FinanceBlockingClientBuilder};


#[cfg(all(test, feature = "async"))]
mod http_tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use secrecy::{ExposeSecret as _, SecretString};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::FinanceClient;
    use crate::credentials::StaticToken;
    use crate::error::{Field, FinanceError};
    use crate::filters::{TransactionFilter, TransactionQuery};
    use crate::models::{
        AccountId, AccountInput, CategoryId, NaiveDate, TransactionDetails, TransactionId,
        TransactionInput, TransactionType,
    };

    /// Client pointed at the mock server's `/api` with a fixed token.
    fn client(server: &MockServer) -> FinanceClient {
        FinanceClient::builder()
            .base_url(format!("{}/api", server.uri()))
            .credentials(Arc::new(StaticToken::new("test-token")))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn accounts_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/accounts"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Nubank", "initialBalance": 100.5, "currentBalance": 80.25}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = client(&server).accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Nubank");
        assert_eq!(accounts[0].balance(), Decimal::new(8025, 2));
    }

    #[tokio::test]
    async fn anonymous_request_has_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/forgot-password"))
            .and(body_json(serde_json::json!({"email": "ana@example.com"})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let anonymous = FinanceClient::builder()
            .base_url(format!("{}/api", server.uri()))
            .build()
            .unwrap();
        anonymous.forgot_password(" ana@example.com ").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn transactions_pass_filters_and_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/transactions"))
            .and(query_param("transactionType", "SAIDA"))
            .and(query_param("page", "0"))
            .and(query_param("size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{
                    "id": 9,
                    "name": "Mercado",
                    "amount": 40.0,
                    "creationDate": "2025-01-02",
                    "transactionType": "SAIDA",
                    "outAccount": {"id": 1, "name": "Nubank"}
                }],
                "number": 0,
                "size": 5,
                "totalPages": 2,
                "totalElements": 6,
                "first": true,
                "last": false
            })))
            .mount(&server)
            .await;

        let mut query = TransactionQuery::paged(5);
        query.set(TransactionFilter::Type(TransactionType::Expense));
        let page = client(&server).transactions(&query).await.unwrap();
        assert_eq!(page.total_pages, 2);
        assert!(!page.last);
        assert_eq!(page.content[0].id, TransactionId::new(9));
        assert_eq!(page.content[0].account_name(), Some("Nubank"));
    }

    #[tokio::test]
    async fn create_transaction_posts_typed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transactions"))
            .and(body_json(serde_json::json!({
                "name": "Mercado",
                "amount": 40.0,
                "creationDate": "2025-01-02",
                "transactionType": "SAIDA",
                "category": {"id": 2},
                "outAccount": {"id": 1}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 10,
                "name": "Mercado",
                "amount": 40.0,
                "creationDate": "2025-01-02",
                "transactionType": "SAIDA"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = TransactionInput::Expense {
            details: TransactionDetails {
                name: "Mercado".to_owned(),
                amount: Decimal::from(40),
                creation_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                category: Some(CategoryId::new(2)),
            },
            out_account: AccountId::new(1),
        };
        let created = client(&server).create_transaction(&input).await.unwrap();
        assert_eq!(created.id, TransactionId::new(10));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .create_account(&AccountInput::new("  ", Decimal::ZERO))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, Field::Name);
    }

    #[tokio::test]
    async fn api_error_uses_message_field() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/categories/3"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "timestamp": "2025-01-01T10:00:00",
                "message": "Access denied",
                "status": 403
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .delete_category(CategoryId::new(3))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Access denied");
    }

    #[tokio::test]
    async fn not_found_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/transactions/77"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .delete_transaction(TransactionId::new(77))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, FinanceError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn delete_many_posts_id_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transactions/delete-multiple"))
            .and(body_json(serde_json::json!([1, 2, 3])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let ids = [1, 2, 3].map(TransactionId::new);
        client(&server).delete_transactions(&ids).await.unwrap();
    }

    #[tokio::test]
    async fn login_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(
                serde_json::json!({"email": "ana@example.com", "password": "s3cret"}),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "a.b.c"})),
            )
            .mount(&server)
            .await;

        let token = client(&server)
            .login("ana@example.com", &SecretString::from("s3cret".to_owned()))
            .await
            .unwrap();
        assert_eq!(token.expose_secret(), "a.b.c");
    }

    #[tokio::test]
    async fn export_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/transactions/export"))
            .and(query_param("name", "aluguel"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]))
            .mount(&server)
            .await;

        let mut query = TransactionQuery::all();
        query.set(TransactionFilter::Name("aluguel".to_owned()));
        let bytes = client(&server)
            .export_transactions(query.filters())
            .await
            .unwrap();
        assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }

    #[tokio::test]
    async fn import_uploads_multipart_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/transactions/import"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .import_transactions("extrato.xlsx", b"sheet".to_vec())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#"name="file""#));
        assert!(body.contains("extrato.xlsx"));
    }

    #[tokio::test]
    async fn dashboard_summary_accepts_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let summary = client(&server).dashboard_summary().await.unwrap();
        assert!(summary.current.is_none());
    }
}
