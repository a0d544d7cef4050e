//! User roles and the access policy

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a user account, from most to least privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Staff,
}

/// Actions that can be performed on inventory records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    AdjustStock,
    Delete,
    ManageUsers,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
        }
    }

    /// Reads and stock adjustments are open to every role; creating and
    /// editing master data needs manager or above; deleting and managing
    /// users is admin only.
    pub fn can(&self, action: Action) -> bool {
        match action {
            Action::View | Action::AdjustStock => true,
            Action::Create | Action::Edit => matches!(self, UserRole::Admin | UserRole::Manager),
            Action::Delete | Action::ManageUsers => matches!(self, UserRole::Admin),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "staff" => Ok(UserRole::Staff),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}
