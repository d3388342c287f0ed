//! User roles and what each one may do.
//!
//! This is a fixed lookup table, not a policy engine. Identity itself comes
//! from whoever runs the CLI or from the server's configured tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TurniError, TurniResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Delete,
    ManageUsers,
    ManageSettings,
    HideFeatures,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
            Permission::ManageUsers => "manage_users",
            Permission::ManageSettings => "manage_settings",
            Permission::HideFeatures => "hide_features",
        };
        write!(f, "{name}")
    }
}

/// Role a user holds in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "operatore")]
    Operator,
    #[serde(rename = "visualizzatore")]
    Viewer,
    /// Signed up asking for admin, waiting for an existing admin to approve.
    #[serde(rename = "pending_admin")]
    PendingAdmin,
}

impl UserRole {
    pub fn permissions(self) -> &'static [Permission] {
        use Permission::*;
        match self {
            UserRole::Admin => &[Read, Write, Delete, ManageUsers, ManageSettings, HideFeatures],
            UserRole::Operator => &[Read, Write],
            UserRole::Viewer | UserRole::PendingAdmin => &[Read],
        }
    }

    pub fn has_permission(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// Like [`has_permission`](Self::has_permission) but as an error for `?`.
    pub fn require(self, permission: Permission) -> TurniResult<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(TurniError::PermissionDenied(permission))
        }
    }

    pub fn can_modify_assignments(self) -> bool {
        self.has_permission(Permission::Write)
    }

    pub fn can_manage_users(self) -> bool {
        self.has_permission(Permission::ManageUsers)
    }

    pub fn can_manage_settings(self) -> bool {
        self.has_permission(Permission::ManageSettings)
    }

    pub fn can_hide_features(self) -> bool {
        self.has_permission(Permission::HideFeatures)
    }

    pub fn is_pending_admin(self) -> bool {
        self == UserRole::PendingAdmin
    }

    /// Role granted at sign-up. Asking for admin only gets `pending_admin`.
    pub fn for_signup(requested: Option<UserRole>) -> UserRole {
        match requested {
            None => UserRole::Viewer,
            Some(UserRole::Admin) | Some(UserRole::PendingAdmin) => UserRole::PendingAdmin,
            Some(role) => role,
        }
    }

    /// Approving a pending admin promotes it; any other role is unchanged.
    pub fn approve(self) -> UserRole {
        match self {
            UserRole::PendingAdmin => UserRole::Admin,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Operator => "operatore",
            UserRole::Viewer => "visualizzatore",
            UserRole::PendingAdmin => "pending_admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for UserRole {
    type Err = TurniError;

    /// Stored names, plus the English ones for the CLI.
    fn from_str(s: &str) -> TurniResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "operatore" | "operator" => Ok(UserRole::Operator),
            "visualizzatore" | "viewer" => Ok(UserRole::Viewer),
            "pending_admin" => Ok(UserRole::PendingAdmin),
            other => Err(TurniError::User(format!(
                "Unknown role '{other}'. Expected admin, operatore or visualizzatore"
            ))),
        }
    }
}
