//! Client-side list state for one [`Resource`] collection.
//!
//! A collection keeps the last fetched page, a loading flag and the last
//! error message, and applies create/update/delete results locally so the
//! list stays in sync without a refetch.

use crate::resource::Resource;

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Returns `true` to proceed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    #[inline]
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms every prompt (non-interactive use, `--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    #[inline]
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Result of a confirmed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The backend deleted the record(s).
    Deleted,
    /// The user declined; no request was sent.
    Cancelled,
}

/// Prompt shown before deleting a single record.
fn delete_prompt<R: Resource>() -> String {
    format!("Are you sure you want to delete this {}?", R::NAME)
}

/// Prompt shown before deleting several records.
fn delete_many_prompt(count: usize) -> String {
    format!("Are you sure you want to delete {count} items?")
}

/// Raises a loading flag and lowers it when dropped, including when a
/// fetch future is abandoned mid-request.
struct LoadingFlag<'a>(&'a mut bool);

impl<'a> LoadingFlag<'a> {
    /// Sets `flag` until the returned guard is dropped.
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Generates a collection type bound to the async or blocking client.
macro_rules! define_collection {
    (
        name: $name:ident,
        client: $client:ty,
        doc: $doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $doc]
        #[derive(Debug)]
        pub struct $name<R: Resource> {
            /// Last fetched page, kept in sync with local mutations.
            page: Page<R>,
            /// Whether a fetch is in flight.
            loading: bool,
            /// Message of the last failed operation.
            last_error: Option<String>,
        }

        impl<R: Resource> Default for $name<R> {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl<R: Resource> $name<R> {
            /// Creates an empty collection.
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self {
                    page: Page::single(Vec::new()),
                    loading: false,
                    last_error: None,
                }
            }

            /// Records currently held.
            #[inline]
            #[must_use]
            pub fn items(&self) -> &[R] {
                &self.page.content
            }

            /// Metadata and content of the last fetched page.
            #[inline]
            #[must_use]
            pub const fn page(&self) -> &Page<R> {
                &self.page
            }

            /// Whether a fetch is in flight.
            #[inline]
            #[must_use]
            pub const fn is_loading(&self) -> bool {
                self.loading
            }

            /// Message of the last failed operation, cleared on success.
            #[inline]
            #[must_use]
            pub fn last_error(&self) -> Option<&str> {
                self.last_error.as_deref()
            }

            /// Replaces the list with the backend's result for `params`.
            /// On failure the list is left unchanged.
            ///
            /// # Errors
            ///
            /// Returns (and records) any client error.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH))]
            pub $($async_kw)? fn fetch(
                &mut self,
                client: &$client,
                params: &[(&'static str, String)],
            ) -> Result<()> {
                let result = {
                    let _loading = LoadingFlag::raise(&mut self.loading);
                    client.list::<R>(params) $( .$await_ext )?
                };
                let page = self.record(result)?;
                tracing::debug!(count = page.content.len(), "fetched");
                self.page = page;
                Ok(())
            }

            /// Creates a record and appends it to the list. Returns the new
            /// record's id.
            ///
            /// # Errors
            ///
            /// Returns (and records) validation or client errors.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH))]
            pub $($async_kw)? fn add(&mut self, client: &$client, input: &R::Input) -> Result<R::Id> {
                let result = client.create::<R>(input) $( .$await_ext )?;
                let created = self.record(result)?;
                let id = created.id();
                self.page.content.push(created);
                self.page.total_elements = self.page.total_elements.saturating_add(1);
                Ok(id)
            }

            /// Updates a record and replaces it in the list.
            ///
            /// # Errors
            ///
            /// Returns (and records) validation or client errors.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, id = %id))]
            pub $($async_kw)? fn update(
                &mut self,
                client: &$client,
                id: R::Id,
                input: &R::Input,
            ) -> Result<()> {
                let result = client.update::<R>(id, input) $( .$await_ext )?;
                let updated = self.record(result)?;
                if let Some(slot) = self.page.content.iter_mut().find(|item| item.id() == id) {
                    *slot = updated;
                }
                Ok(())
            }

            /// Deletes a record after confirmation and drops it from the list.
            ///
            /// # Errors
            ///
            /// Returns (and records) any client error. A declined
            /// confirmation is not an error.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, id = %id))]
            pub $($async_kw)? fn delete<C: Confirm + ?Sized>(
                &mut self,
                client: &$client,
                id: R::Id,
                confirm: &mut C,
            ) -> Result<DeleteOutcome> {
                if !confirm.confirm(&delete_prompt::<R>()) {
                    tracing::debug!("delete cancelled");
                    return Ok(DeleteOutcome::Cancelled);
                }
                let result = client.delete::<R>(id) $( .$await_ext )?;
                self.record(result)?;
                self.remove_where(|item| item.id() == id);
                Ok(DeleteOutcome::Deleted)
            }

            /// Deletes several records after confirmation.
            ///
            /// # Errors
            ///
            /// Returns (and records) any client error.
            #[inline]
            #[tracing::instrument(skip_all, fields(path = R::PATH, count = ids.len()))]
            pub $($async_kw)? fn delete_many<C: Confirm + ?Sized>(
                &mut self,
                client: &$client,
                ids: &[R::Id],
                confirm: &mut C,
            ) -> Result<DeleteOutcome> {
                if ids.is_empty() || !confirm.confirm(&delete_many_prompt(ids.len())) {
                    tracing::debug!("bulk delete cancelled");
                    return Ok(DeleteOutcome::Cancelled);
                }
                let result = client.delete_many::<R>(ids) $( .$await_ext )?;
                self.record(result)?;
                self.remove_where(|item| ids.contains(&item.id()));
                Ok(DeleteOutcome::Deleted)
            }

            /// Stores or clears the error message depending on `result`.
            fn record<T>(&mut self, result: Result<T>) -> Result<T> {
                match result {
                    Ok(value) => {
                        self.last_error = None;
                        Ok(value)
                    }
                    Err(err) => {
                        tracing::warn!(path = R::PATH, error = %err, "operation failed");
                        self.last_error = Some(err.user_message());
                        Err(err)
                    }
                }
            }

            /// Drops matching records and adjusts the element count.
            fn remove_where<F: FnMut(&R) -> bool>(&mut self, mut matches: F) {
                let before = self.page.content.len();
                self.page.content.retain(|item| !matches(item));
                let removed = before - self.page.content.len();
                self.page.total_elements = self
                    .page
                    .total_elements
                    .saturating_sub(u64::try_from(removed).unwrap_or(u64::MAX));
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_collection {
    //! Collection bound to the async client.

    use super::{Confirm, DeleteOutcome, LoadingFlag, delete_many_prompt, delete_prompt};
    use crate::client::FinanceClient;
    use crate::error::Result;
    use crate::models::Page;
    use crate::resource::Resource;

    define_collection! {
        name: Collection,
        client: FinanceClient,
        doc: "List state for one collection, driven by the async [`FinanceClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_collection {
    //! Collection bound to the blocking client.

    use super::{Confirm, DeleteOutcome, LoadingFlag, delete_many_prompt, delete_prompt};
    use crate::client::FinanceBlockingClient;
    use crate::error::Result;
    use crate::models::Page;
    use crate::resource::Resource;

    define_collection! {
        name: BlockingCollection,
        client: FinanceBlockingClient,
        doc: "List state for one collection, driven by the [`FinanceBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_collection::Collection;
#[cfg(feature = "blocking")]
pub use blocking_collection::BlockingCollection;

#[cfg(all(test, feature = "async"))]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::FinanceClient;
    use crate::credentials::StaticToken;
    use crate::models::{Category, CategoryId, CategoryInput};

    /// Client pointed at the mock server.
    fn client(server: &MockServer) -> FinanceClient {
        FinanceClient::builder()
            .base_url(format!("{}/api", server.uri()))
            .credentials(Arc::new(StaticToken::new("t")))
            .build()
            .unwrap()
    }

    /// Mounts `GET /api/categories` returning two categories.
    async fn mount_categories(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Mercado"},
                {"id": 2, "name": "Lazer"}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetch_replaces_items() {
        let server = MockServer::start().await;
        mount_categories(&server).await;
        let client = client(&server);

        let mut categories = Collection::<Category>::new();
        categories.fetch(&client, &[]).await.unwrap();
        assert_eq!(categories.items().len(), 2);
        assert!(!categories.is_loading());
        assert!(categories.last_error().is_none());
    }

    #[tokio::test]
    async fn abandoned_fetch_clears_loading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let client = client(&server);

        let mut categories = Collection::<Category>::new();
        let timed_out =
            tokio::time::timeout(Duration::from_millis(50), categories.fetch(&client, &[])).await;
        assert!(timed_out.is_err());
        assert!(!categories.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_list_and_records_error() {
        let server = MockServer::start().await;
        mount_categories(&server).await;
        let client = client(&server);
        let mut categories = Collection::<Category>::new();
        categories.fetch(&client, &[]).await.unwrap();

        server.reset().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"message": "An internal error occurred"})),
            )
            .mount(&server)
            .await;

        assert!(categories.fetch(&client, &[]).await.is_err());
        assert_eq!(categories.items().len(), 2);
        assert_eq!(categories.last_error(), Some("An internal error occurred"));
    }

    #[tokio::test]
    async fn add_and_update_apply_locally() {
        let server = MockServer::start().await;
        mount_categories(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/categories"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 3, "name": "Saúde"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/categories/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 1, "name": "Supermercado"})),
            )
            .mount(&server)
            .await;
        let client = client(&server);

        let mut categories = Collection::<Category>::new();
        categories.fetch(&client, &[]).await.unwrap();
        let added = categories
            .add(&client, &CategoryInput::new("Saúde"))
            .await
            .unwrap();
        assert_eq!(added, CategoryId::new(3));
        categories
            .update(&client, CategoryId::new(1), &CategoryInput::new("Supermercado"))
            .await
            .unwrap();

        let names: Vec<&str> = categories.items().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Supermercado", "Lazer", "Saúde"]);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let server = MockServer::start().await;
        mount_categories(&server).await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let client = client(&server);

        let mut categories = Collection::<Category>::new();
        categories.fetch(&client, &[]).await.unwrap();
        let mut decline = |_: &str| false;
        let outcome = categories
            .delete(&client, CategoryId::new(1), &mut decline)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(categories.items().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_bulk_delete_removes_items() {
        let server = MockServer::start().await;
        mount_categories(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/categories/delete-multiple"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let client = client(&server);

        let mut categories = Collection::<Category>::new();
        categories.fetch(&client, &[]).await.unwrap();
        let mut prompts = Vec::new();
        let mut record_prompt = |prompt: &str| {
            prompts.push(prompt.to_owned());
            true
        };
        let outcome = categories
            .delete_many(&client, &[CategoryId::new(1), CategoryId::new(2)], &mut record_prompt)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(categories.items().is_empty());
        assert_eq!(prompts, vec!["Are you sure you want to delete 2 items?"]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_item() {
        let server = MockServer::start().await;
        mount_categories(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/api/categories/2"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"message": "Category is in use"})),
            )
            .mount(&server)
            .await;
        let client = client(&server);

        let mut categories = Collection::<Category>::new();
        categories.fetch(&client, &[]).await.unwrap();
        let result = categories
            .delete(&client, CategoryId::new(2), &mut AssumeYes)
            .await;
        assert!(result.is_err());
        assert_eq!(categories.items().len(), 2);
        assert_eq!(categories.last_error(), Some("Category is in use"));
    }
}
