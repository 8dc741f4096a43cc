use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
    Manager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageProducts,
    ViewOrders,
    ManageOrders,
    ViewActivityLog,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
            Self::Manager => "manager",
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        match self {
            Self::Customer => false,
            Self::Admin => matches!(
                capability,
                Capability::ManageProducts | Capability::ViewOrders | Capability::ManageOrders
            ),
            Self::Manager => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            other => Err(DomainError::InvalidInput(format!("unknown role '{other}'"))),
        }
    }
}

/// The authenticated person performing a back-office action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn authorize(&self, capability: Capability) -> Result<(), DomainError> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} may not {:?}",
                self.role, capability
            )))
        }
    }
}
