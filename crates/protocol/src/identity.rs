//! Users, roles, menus and the login exchange

use serde::{Deserialize, Serialize};

use crate::paging::null_as_empty;

/// Role code that grants every route
pub const ADMIN_ROLE: &str = "admin";

/// `POST /api/v1/login` body. The password is a client-side digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Payload of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Signed-in principal as returned by `/users/info` and the login reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub phone: String,
    pub avatar: String,
    /// 1 enabled, 0 disabled
    pub status: i64,
    #[serde(
        alias = "roleIds",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub role_ids: Vec<u64>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub roles: Vec<Role>,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(alias = "updatedAt")]
    pub updated_at: String,
}

impl User {
    /// Nickname when set, username otherwise
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.username
        } else {
            &self.nickname
        }
    }

    /// Role codes held by the user
    pub fn role_codes(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.code.clone()).collect()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.code == ADMIN_ROLE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: u64,
    pub name: String,
    pub code: String,
    pub status: i64,
    pub remark: String,
    #[serde(
        alias = "menuIds",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub menu_ids: Vec<u64>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub menus: Vec<Menu>,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(alias = "updatedAt")]
    pub updated_at: String,
}

/// Menu entry; `children` is only populated by the tree endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Menu {
    pub id: u64,
    #[serde(alias = "parentId")]
    pub parent_id: u64,
    pub name: String,
    pub path: String,
    pub component: String,
    pub icon: String,
    pub sort: i64,
    /// 1 menu, 2 button
    #[serde(rename = "type")]
    pub kind: i64,
    pub status: i64,
    pub hidden: bool,
    pub cache: bool,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub children: Vec<Menu>,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(alias = "updatedAt")]
    pub updated_at: String,
}

/// `PUT /roles/{id}/menus` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuAssignment {
    pub menu_ids: Vec<u64>,
}

/// `PUT /users/{id}` body when only the status changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: i64,
}
