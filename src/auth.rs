//! Session state: who is signed in, and the token that proves it.
//!
//! A session owns a client whose credential provider is the session's own
//! token store, so a successful login immediately authorizes every later
//! request made through [`AuthSession::client`].

use crate::models::User;

/// Authentication state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The persisted token has not been examined yet.
    Loading,
    /// A valid token is held for this user.
    Authenticated(User),
    /// No usable token.
    Unauthenticated,
}

impl AuthState {
    /// The signed-in user, if any.
    #[inline]
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match *self {
            Self::Authenticated(ref user) => Some(user),
            Self::Loading | Self::Unauthenticated => None,
        }
    }
}

/// Generates a session type bound to the async or blocking client.
macro_rules! define_session {
    (
        name: $name:ident,
        client: $client:ty,
        builder: $builder:ty,
        doc: $doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $doc]
        #[derive(Debug)]
        pub struct $name<S: TokenStore + 'static> {
            /// Client authorized by `store`.
            client: $client,
            /// Persistent token slot.
            store: Arc<S>,
            /// Current state.
            state: AuthState,
        }

        impl<S: TokenStore + 'static> $name<S> {
            /// Builds the session's client from `builder`, wiring `store` in
            /// as its credential provider. The session starts in
            /// [`AuthState::Loading`]; call [`Self::restore`] next.
            ///
            /// # Errors
            ///
            /// Returns an error if the client cannot be built.
            #[inline]
            pub fn new(builder: $builder, store: Arc<S>) -> Result<Self> {
                let client = builder.credentials(Arc::clone(&store)).build()?;
                Ok(Self {
                    client,
                    store,
                    state: AuthState::Loading,
                })
            }

            /// Client that sends the session token.
            #[inline]
            #[must_use]
            pub const fn client(&self) -> &$client {
                &self.client
            }

            /// Current state.
            #[inline]
            #[must_use]
            pub const fn state(&self) -> &AuthState {
                &self.state
            }

            /// Token store backing the session.
            #[inline]
            #[must_use]
            pub const fn store(&self) -> &Arc<S> {
                &self.store
            }

            /// Examines the persisted token. A missing token leaves the
            /// session unauthenticated; an undecodable one, or a token slot
            /// whose contents cannot be parsed, is cleared.
            ///
            /// # Errors
            ///
            /// Returns an error if the store cannot be read, or cannot be
            /// cleared after a decode failure.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn restore(&mut self) -> Result<&AuthState> {
                self.state = AuthState::Unauthenticated;
                let token = match self.store.load() {
                    Ok(Some(token)) => token,
                    Ok(None) => {
                        tracing::debug!("no stored token");
                        return Ok(&self.state);
                    }
                    Err(FinanceError::Serialization(err)) => {
                        tracing::warn!(error = %err, "discarding corrupt token store");
                        self.store.clear()?;
                        return Ok(&self.state);
                    }
                    Err(err) => return Err(err),
                };
                match decode_claims(token.expose_secret()) {
                    Ok(claims) => {
                        tracing::debug!(user = %claims.sub, "restored session");
                        self.state = AuthState::Authenticated(claims.user());
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "discarding unreadable token");
                        self.store.clear()?;
                    }
                }
                Ok(&self.state)
            }

            /// Signs in, persists the issued token and decodes its claims.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Validation`] for empty credentials,
            /// [`FinanceError::Api`] for rejected credentials, or
            /// [`FinanceError::InvalidToken`] if the issued token cannot be
            /// decoded (it is not kept).
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn login(&mut self, email: &str, password: &SecretString) -> Result<&User> {
                let token = self.client.login(email, password) $( .$await_ext )? ?;
                self.adopt_token(&token)
            }

            /// Creates a user account. Does not sign in.
            ///
            /// # Errors
            ///
            /// Returns any validation or client error.
            #[inline]
            pub $($async_kw)? fn register(
                &self,
                name: Option<&str>,
                email: &str,
                password: &SecretString,
            ) -> Result<()> {
                self.client.register(name, email, password) $( .$await_ext )?
            }

            /// Requests a password-reset email.
            ///
            /// # Errors
            ///
            /// Returns any client error.
            #[inline]
            pub $($async_kw)? fn forgot_password(&self, email: &str) -> Result<()> {
                self.client.forgot_password(email) $( .$await_ext )?
            }

            /// Sets a new password using a reset token.
            ///
            /// # Errors
            ///
            /// Returns any client error.
            #[inline]
            pub $($async_kw)? fn reset_password(
                &self,
                token: &str,
                new_password: &SecretString,
            ) -> Result<()> {
                self.client.reset_password(token, new_password) $( .$await_ext )?
            }

            /// Renames the signed-in user and adopts the fresh token the
            /// backend issues with the new claims.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Unauthenticated`] without a session,
            /// otherwise any validation, client or token error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn update_profile(&mut self, name: &str) -> Result<&User> {
                let _user = self.require_user()?;
                let update = self.client.update_profile(name) $( .$await_ext )? ?;
                self.adopt_token(&SecretString::from(update.token))
            }

            /// Changes the signed-in user's password.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Unauthenticated`] without a session,
            /// otherwise any validation or client error.
            #[inline]
            pub $($async_kw)? fn change_password(
                &self,
                current_password: &SecretString,
                new_password: &SecretString,
            ) -> Result<()> {
                let _user = self.require_user()?;
                self.client
                    .change_password(current_password, new_password)
                    $( .$await_ext )?
            }

            /// Forgets the token and the user.
            ///
            /// # Errors
            ///
            /// Returns an error if the store cannot be cleared; the in-memory
            /// state is reset regardless.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn logout(&mut self) -> Result<()> {
                self.state = AuthState::Unauthenticated;
                tracing::debug!("logging out");
                self.store.clear()
            }

            /// Guard for operations that need a signed-in user.
            ///
            /// # Errors
            ///
            /// Returns [`FinanceError::Unauthenticated`] unless the session is
            /// authenticated.
            #[inline]
            pub fn require_user(&self) -> Result<&User> {
                self.state.user().ok_or(FinanceError::Unauthenticated)
            }

            /// Persists `token` and switches to the user it names. A token
            /// that cannot be decoded is cleared again.
            fn adopt_token(&mut self, token: &SecretString) -> Result<&User> {
                self.store.save(token)?;
                match decode_claims(token.expose_secret()) {
                    Ok(claims) => {
                        tracing::debug!(user = %claims.sub, "signed in");
                        self.state = AuthState::Authenticated(claims.user());
                        self.require_user()
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "backend issued an unreadable token");
                        self.state = AuthState::Unauthenticated;
                        self.store.clear()?;
                        Err(err)
                    }
                }
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_session {
    //! Session bound to the async client.

    use std::sync::Arc;

    use secrecy::{ExposeSecret as _, SecretString};

    use super::AuthState;
    use crate::claims::decode_claims;
    use crate::client::{FinanceClient, FinanceClientBuilder};
    use crate::credentials::TokenStore;
    use crate::error::{FinanceError, Result};
    use crate::models::User;

    define_session! {
        name: AuthSession,
        client: FinanceClient,
        builder: FinanceClientBuilder,
        doc: "Signed-in state driving the async [`FinanceClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_session {
    //! Session bound to the blocking client.

    use std::sync::Arc;

    use secrecy::{ExposeSecret as _, SecretString};

    use super::AuthState;
    use crate::claims::decode_claims;
    use crate::client::{FinanceBlockingClient, FinanceBlockingClientBuilder};
    use crate::credentials::TokenStore;
    use crate::error::{FinanceError, Result};
    use crate::models::User;

    define_session! {
        name: BlockingAuthSession,
        client: FinanceBlockingClient,
        builder: FinanceBlockingClientBuilder,
        doc: "Signed-in state driving the [`FinanceBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_session::AuthSession;
#[cfg(feature = "blocking")]
pub use blocking_session::BlockingAuthSession;

#[cfg(all(test, feature = "async"))]
mod tests {
    use std::sync::Arc;

    use secrecy::{ExposeSecret as _, SecretString};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::claims::tests::make_token;
    use crate::client::FinanceClient;
    use crate::credentials::{InMemoryTokenStore, TokenStore as _};
    use crate::error::FinanceError;

    /// Session against the mock server with an in-memory store.
    fn session(server: &MockServer, store: Arc<InMemoryTokenStore>) -> AuthSession<InMemoryTokenStore> {
        let builder = FinanceClient::builder().base_url(format!("{}/api", server.uri()));
        AuthSession::new(builder, store).unwrap()
    }

    /// Token naming Ana.
    fn ana_token() -> String {
        make_token(&serde_json::json!({"sub": "ana@example.com", "name": "Ana"}))
    }

    #[tokio::test]
    async fn restore_without_token_is_unauthenticated() {
        let server = MockServer::start().await;
        let mut session = session(&server, Arc::new(InMemoryTokenStore::new()));
        assert_eq!(*session.state(), AuthState::Loading);
        assert_eq!(*session.restore().unwrap(), AuthState::Unauthenticated);
        assert!(matches!(
            session.require_user(),
            Err(FinanceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn restore_decodes_stored_token() {
        let server = MockServer::start().await;
        let store = Arc::new(InMemoryTokenStore::with_token(ana_token()));
        let mut session = session(&server, store);
        let _state = session.restore().unwrap();
        assert_eq!(session.require_user().unwrap().display_name(), "Ana");
    }

    #[tokio::test]
    async fn restore_clears_garbage_token() {
        let server = MockServer::start().await;
        let store = Arc::new(InMemoryTokenStore::with_token("garbage"));
        let mut session = session(&server, Arc::clone(&store));
        assert_eq!(*session.restore().unwrap(), AuthState::Unauthenticated);
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(feature = "token-file")]
    #[tokio::test]
    async fn restore_clears_corrupt_token_file() {
        use crate::credentials::FileTokenStore;

        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileTokenStore::new(dir.path().to_path_buf()).unwrap());
        std::fs::write(store.path(), "{not json").unwrap();

        let builder = FinanceClient::builder().base_url(format!("{}/api", server.uri()));
        let mut session = AuthSession::new(builder, Arc::clone(&store)).unwrap();
        assert_eq!(*session.restore().unwrap(), AuthState::Unauthenticated);
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn login_persists_token_and_authorizes_client() {
        let server = MockServer::start().await;
        let token = ana_token();
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": token})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/accounts"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::new());
        let mut session = session(&server, Arc::clone(&store));
        let _state = session.restore().unwrap();
        let user = session
            .login("ana@example.com", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), token);

        let accounts = session.client().accounts().await.unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn login_with_unreadable_token_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "nope"})),
            )
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::new());
        let mut session = session(&server, Arc::clone(&store));
        let err = session
            .login("ana@example.com", &SecretString::from("pw".to_owned()))
            .await
            .unwrap_err();
        assert!(matches!(err, FinanceError::InvalidToken(_)));
        assert!(store.load().unwrap().is_none());
        assert_eq!(*session.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn rejected_login_keeps_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut session = session(&server, Arc::new(InMemoryTokenStore::new()));
        let _state = session.restore().unwrap();
        let err = session
            .login("ana@example.com", &SecretString::from("wrong".to_owned()))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(session.require_user().is_err());
    }

    #[tokio::test]
    async fn logout_clears_token_and_user() {
        let server = MockServer::start().await;
        let store = Arc::new(InMemoryTokenStore::with_token(ana_token()));
        let mut session = session(&server, Arc::clone(&store));
        let _state = session.restore().unwrap();
        assert!(session.require_user().is_ok());

        session.logout().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(matches!(
            session.require_user(),
            Err(FinanceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn update_profile_adopts_fresh_token() {
        let server = MockServer::start().await;
        let renamed = make_token(&serde_json::json!({"sub": "ana@example.com", "name": "Ana Souza"}));
        Mock::given(method("PUT"))
            .and(path("/api/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"id": 1, "name": "Ana Souza", "email": "ana@example.com"},
                "token": renamed
            })))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryTokenStore::with_token(ana_token()));
        let mut session = session(&server, Arc::clone(&store));
        let _state = session.restore().unwrap();
        let user = session.update_profile("Ana Souza").await.unwrap();
        assert_eq!(user.display_name(), "Ana Souza");
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), renamed);
    }

    #[tokio::test]
    async fn protected_calls_require_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = session(&server, Arc::new(InMemoryTokenStore::new()));
        let _state = session.restore().unwrap();
        let pw = SecretString::from("x".to_owned());
        assert!(matches!(
            session.change_password(&pw, &pw).await,
            Err(FinanceError::Unauthenticated)
        ));
    }
}
