//! Users, roles and menus

use std::ops::Deref;

use eden_console_protocol::{Menu, MenuAssignment, Role, StatusUpdate, User};

use super::{collection, Resource};
use crate::error::Result;
use crate::session::{SessionController, USER_INFO_PATH};
use crate::transport::ApiRequest;

pub struct UsersApi<'a> {
    resource: Resource<'a, User>,
}

impl<'a> UsersApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "users"),
        }
    }

    /// Profile of the signed-in user, always fetched
    pub async fn info(&self) -> Result<User> {
        self.session().fetch(&ApiRequest::get(USER_INFO_PATH)).await
    }

    pub async fn roles(&self, id: u64) -> Result<Vec<Role>> {
        let path = format!("{}/roles", self.item_path(id));
        collection(self.session(), &ApiRequest::get(path)).await
    }

    /// Replace the user's roles; the body is the bare id array
    pub async fn assign_roles(&self, id: u64, role_ids: &[u64]) -> Result<()> {
        let path = format!("{}/roles", self.item_path(id));
        let request = ApiRequest::put(path).json(role_ids)?;
        self.session().execute(&request).await
    }

    /// 1 enables the account, 0 disables it
    pub async fn update_status(&self, id: u64, status: i64) -> Result<()> {
        let request = ApiRequest::put(self.item_path(id)).json(&StatusUpdate { status })?;
        self.session().execute(&request).await
    }
}

impl<'a> Deref for UsersApi<'a> {
    type Target = Resource<'a, User>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

pub struct RolesApi<'a> {
    resource: Resource<'a, Role>,
}

impl<'a> RolesApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "roles"),
        }
    }

    pub async fn menus(&self, id: u64) -> Result<Vec<Menu>> {
        let path = format!("{}/menus", self.item_path(id));
        collection(self.session(), &ApiRequest::get(path)).await
    }

    pub async fn assign_menus(&self, id: u64, menu_ids: &[u64]) -> Result<()> {
        let path = format!("{}/menus", self.item_path(id));
        let request = ApiRequest::put(path).json(&MenuAssignment {
            menu_ids: menu_ids.to_vec(),
        })?;
        self.session().execute(&request).await
    }
}

impl<'a> Deref for RolesApi<'a> {
    type Target = Resource<'a, Role>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}

pub struct MenusApi<'a> {
    resource: Resource<'a, Menu>,
}

impl<'a> MenusApi<'a> {
    pub fn new(session: &'a SessionController) -> Self {
        Self {
            resource: Resource::new(session, "menus"),
        }
    }

    /// Whole menu hierarchy with `children` populated
    pub async fn tree(&self) -> Result<Vec<Menu>> {
        let path = format!("{}/tree", self.path());
        collection(self.session(), &ApiRequest::get(path)).await
    }
}

impl<'a> Deref for MenusApi<'a> {
    type Target = Resource<'a, Menu>;

    fn deref(&self) -> &Self::Target {
        &self.resource
    }
}
