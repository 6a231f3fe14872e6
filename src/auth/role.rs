use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application role stored on the profile. New profiles start as `Pending`
/// until an administrator assigns one of the working roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    #[serde(rename = "pending")]
    #[sqlx(rename = "pending")]
    Pending,
    #[serde(rename = "cliente")]
    #[sqlx(rename = "cliente")]
    Client,
    #[serde(rename = "analista")]
    #[sqlx(rename = "analista")]
    Analyst,
    #[serde(rename = "abogado")]
    #[sqlx(rename = "abogado")]
    Lawyer,
    #[serde(rename = "admin")]
    #[sqlx(rename = "admin")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Pending, Role::Client, Role::Analyst, Role::Lawyer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Pending => "pending",
            Role::Client => "cliente",
            Role::Analyst => "analista",
            Role::Lawyer => "abogado",
            Role::Admin => "admin",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Role::Pending)
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Role::Client)
    }

    pub fn is_analyst(&self) -> bool {
        matches!(self, Role::Analyst)
    }

    pub fn is_lawyer(&self) -> bool {
        matches!(self, Role::Lawyer)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Analysts and lawyers: the people who work cases they are assigned to.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Analyst | Role::Lawyer)
    }

    /// Any role other than `Pending`.
    pub fn is_assigned(&self) -> bool {
        !self.is_pending()
    }

    /// Front-end landing path for this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Pending => "/pending",
            Role::Client => "/dashboard/cliente",
            Role::Analyst => "/dashboard/analista",
            Role::Lawyer => "/dashboard/abogado",
            Role::Admin => "/dashboard/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
