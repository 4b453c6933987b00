//! Cloud accounts, cloud providers, database and server configs

use std::ops::Deref;

use eden_console_protocol::{CloudAccount, CloudProvider, DatabaseConfig, ServerConfig, StatusUpdate};

use super::Resource;
use crate::error::Result;
use crate::session::SessionController;
use crate::transport::ApiRequest;

pub struct CloudAccountsApi<'a> {
    resource: Resource<'a, CloudAccount>,
}

impl<'a> CloudAccountsApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "cloud-accounts"),
        }
    }

    /// Ask the backend to verify the stored keys against the provider
    pub async fn test(&self, id: u64) -> Result<()> {
        let path = format!("{}/test", self.item_path(id));
        self.session().execute(&ApiRequest::post(path)).await
    }

    pub async fn update_status(&self, id: u64, status: i64) -> Result<()> {
        let request = ApiRequest::put(self.item_path(id)).json(&StatusUpdate { status })?;
        self.session().execute(&request).await
    }
}

impl<'a> Deref for CloudAccountsApi<'a> {
    type Target = Resource<'a, CloudAccount>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

pub struct CloudProvidersApi<'a> {
    resource: Resource<'a, CloudProvider>,
}

impl<'a> CloudProvidersApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "cloud-providers"),
        }
    }
}

impl<'a> Deref for CloudProvidersApi<'a> {
    type Target = Resource<'a, CloudProvider>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

pub struct DatabaseConfigsApi<'a> {
    resource: Resource<'a, DatabaseConfig>,
}

impl<'a> DatabaseConfigsApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "database-configs"),
        }
    }

    /// Try connecting with an unsaved config
    pub async fn test(&self, config: &DatabaseConfig) -> Result<()> {
        let request = ApiRequest::post(format!("{}/test", self.path())).json(config)?;
        self.session().execute(&request).await
    }
}

impl<'a> Deref for DatabaseConfigsApi<'a> {
    type Target = Resource<'a, DatabaseConfig>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

pub struct ServerConfigsApi<'a> {
    resource: Resource<'a, ServerConfig>,
}

impl<'a> ServerConfigsApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "server-configs"),
        }
    }

    /// Try an SSH connection with an unsaved config
    pub async fn test(&self, config: &ServerConfig) -> Result<()> {
        let request = ApiRequest::post(format!("{}/test", self.path())).json(config)?;
        self.session().execute(&request).await
    }
}

impl<'a> Deref for ServerConfigsApi<'a> {
    type Target = Resource<'a, ServerConfig>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}
