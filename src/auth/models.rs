// Authorization data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role carried in JWT claims
///
/// Roles form a hierarchy: Admin > Manager > Cashier. A role satisfies a
/// requirement when it sits at or above the required role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

impl Role {
    /// Convert role to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Cashier => "CASHIER",
        }
    }

    /// Parse role from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "CASHIER" => Ok(Role::Cashier),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }

    /// Numeric rank for hierarchy checks; higher is more privileged
    fn rank(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Manager => 2,
            Role::Cashier => 1,
        }
    }

    /// Whether this role satisfies `required`
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
