//! Collection agent management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::AgentId;

/// Role held by a system user
///
/// Restricted reconciliation operations (clearance updates, payment
/// deletion) require the caller's role to be passed in explicitly; there
/// is no ambient "current user" anywhere in the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Back-office administrator
    Admin,
    /// Debt recovery agent working a route
    Dra,
}

impl AgentRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, AgentRole::Admin)
    }

    /// Parses the role string stored in the database
    pub fn from_code(code: &str) -> Option<AgentRole> {
        match code {
            "admin" => Some(AgentRole::Admin),
            "dra" => Some(AgentRole::Dra),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AgentRole::Admin => "admin",
            AgentRole::Dra => "dra",
        }
    }
}

/// A collection agent or administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: AgentRole,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Creates a new agent
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: AgentRole,
    ) -> Self {
        Self {
            id: AgentId::new_v7(),
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes_round_trip() {
        assert_eq!(AgentRole::from_code("admin"), Some(AgentRole::Admin));
        assert_eq!(AgentRole::from_code("dra"), Some(AgentRole::Dra));
        assert_eq!(AgentRole::from_code("manager"), None);
        assert_eq!(AgentRole::from_code(AgentRole::Dra.code()), Some(AgentRole::Dra));
    }

    #[test]
    fn test_admin_capability() {
        let admin = Agent::new("meera", "meera@example.com", "Meera Iyer", AgentRole::Admin);
        let dra = Agent::new("ravi", "ravi@example.com", "Ravi Kumar", AgentRole::Dra);

        assert!(admin.is_admin());
        assert!(!dra.is_admin());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&AgentRole::Dra).unwrap();
        assert_eq!(json, "\"dra\"");
    }
}
