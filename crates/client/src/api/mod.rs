//! Endpoint wrappers over the session
//!
//! Each domain API borrows the [`SessionController`] so every call carries the
//! current credential and a rejected token ends the session. The CRUD routes
//! share one shape and go through [`Resource`].

use std::marker::PhantomData;

use eden_console_protocol::{PageQuery, PageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RequestError, Result};
use crate::session::SessionController;
use crate::transport::ApiRequest;

mod identity;
mod infrastructure;
mod kubernetes;
mod tools;

pub use identity::{MenusApi, RolesApi, UsersApi};
pub use infrastructure::{CloudAccountsApi, CloudProvidersApi, DatabaseConfigsApi, ServerConfigsApi};
pub use kubernetes::{
    HistoryApi, K8sConfigsApi, NamespacesApi, NodesApi, PodsApi, WorkloadsApi, HISTORY_PREFIX,
};
pub use tools::ToolsApi;

/// Prefix of every enveloped endpoint
pub const API_PREFIX: &str = "/api/v1";

/// `/api/v1/{name}`
pub fn endpoint(name: &str) -> String {
    format!("{API_PREFIX}/{name}")
}

/// Reject page selectors the backend would silently clamp
pub fn check_page(page: &PageQuery) -> Result<()> {
    if page.is_valid() {
        Ok(())
    } else {
        Err(RequestError::Validation(format!(
            "page and pageSize must be at least 1 (got page={}, pageSize={})",
            page.page, page.page_size
        )))
    }
}

/// [`check_page`], reporting a rejected selector like any failed call
pub(crate) fn accept_page(session: &SessionController, page: &PageQuery) -> Result<()> {
    check_page(page).map_err(|e| session.reject(e))
}

/// Array payload; a `null` or absent `data` reads as empty
pub(crate) async fn collection<U: DeserializeOwned>(
    session: &SessionController,
    request: &ApiRequest,
) -> Result<Vec<U>> {
    let items: Option<Vec<U>> = session.request(request).await?.into_data();
    Ok(items.unwrap_or_default())
}

/// List, detail, create, update and delete under one collection path
pub struct Resource<'a, T> {
    session: &'a SessionController,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> Resource<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(session: &'a SessionController, name: &str) -> Self {
        Self {
            session,
            path: endpoint(name),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn item_path(&self, id: u64) -> String {
        format!("{}/{id}", self.path)
    }

    pub(crate) const fn session(&self) -> &'a SessionController {
        self.session
    }

    pub async fn list(&self, page: &PageQuery) -> Result<PageResult<T>> {
        accept_page(self.session, page)?;
        self.list_by(page).await
    }

    /// List with endpoint-specific filters next to the page selector
    pub async fn list_by<Q: Serialize + ?Sized>(&self, query: &Q) -> Result<PageResult<T>> {
        let request = ApiRequest::get(self.path.as_str()).query(query)?;
        let page: Option<PageResult<T>> = self.session.request(&request).await?.into_data();
        Ok(page.unwrap_or_default())
    }

    pub async fn get(&self, id: u64) -> Result<T> {
        self.session
            .fetch(&ApiRequest::get(self.item_path(id)))
            .await
    }

    pub async fn create(&self, item: &T) -> Result<T> {
        let request = ApiRequest::post(self.path.as_str()).json(item)?;
        self.session.fetch(&request).await
    }

    pub async fn update(&self, id: u64, item: &T) -> Result<T> {
        let request = ApiRequest::put(self.item_path(id)).json(item)?;
        self.session.fetch(&request).await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.session
            .execute(&ApiRequest::delete(self.item_path(id)))
            .await
    }
}
