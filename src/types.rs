/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Account roles carried in the JWT and checked by the permission layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

/// Named capabilities that gate each whiskey operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ReadWhiskey,
    CreateWhiskey,
    UpdateWhiskey,
    DeleteWhiskey,
    AdminPanel,
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;

        match self {
            Role::Admin => &[ReadWhiskey, CreateWhiskey, UpdateWhiskey, DeleteWhiskey, AdminPanel],
            Role::Editor => &[ReadWhiskey, CreateWhiskey, UpdateWhiskey, DeleteWhiskey],
            Role::Viewer => &[ReadWhiskey],
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid role \"{0}\"; expected admin, editor or viewer")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::ReadWhiskey => "read_whiskey",
            Permission::CreateWhiskey => "create_whiskey",
            Permission::UpdateWhiskey => "update_whiskey",
            Permission::DeleteWhiskey => "delete_whiskey",
            Permission::AdminPanel => "admin_panel",
        };
        f.write_str(name)
    }
}
