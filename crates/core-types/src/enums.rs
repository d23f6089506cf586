use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every kind of record the scheduling domain stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Department,
    Team,
    User,
    ShiftType,
    ShiftTemplate,
    Schedule,
    Shift,
    TeamMember,
}

impl EntityKind {
    /// All kinds, parents before children. Inserts follow this order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Department,
        EntityKind::Team,
        EntityKind::User,
        EntityKind::ShiftType,
        EntityKind::ShiftTemplate,
        EntityKind::Schedule,
        EntityKind::Shift,
        EntityKind::TeamMember,
    ];

    /// All kinds, children before parents. Bulk deletes follow this order.
    pub const PURGE_ORDER: [EntityKind; 8] = [
        EntityKind::TeamMember,
        EntityKind::Shift,
        EntityKind::ShiftTemplate,
        EntityKind::Schedule,
        EntityKind::User,
        EntityKind::ShiftType,
        EntityKind::Team,
        EntityKind::Department,
    ];

    /// The storage table backing this kind.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Department => "departments",
            EntityKind::Team => "teams",
            EntityKind::User => "users",
            EntityKind::ShiftType => "shift_types",
            EntityKind::ShiftTemplate => "shift_templates",
            EntityKind::Schedule => "schedules",
            EntityKind::Shift => "shifts",
            EntityKind::TeamMember => "team_members",
        }
    }

    /// The name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Department => "Department",
            EntityKind::Team => "Team",
            EntityKind::User => "User",
            EntityKind::ShiftType => "ShiftType",
            EntityKind::ShiftTemplate => "ShiftTemplate",
            EntityKind::Schedule => "Schedule",
            EntityKind::Shift => "Shift",
            EntityKind::TeamMember => "TeamMember",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The role tag carried by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub const NAMES: &'static [&'static str] = &["admin", "manager", "employee"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(CoreError::InvalidInput("role".to_string(), other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_order_covers_every_kind() {
        let mut purge = EntityKind::PURGE_ORDER.to_vec();
        purge.sort();
        let mut all = EntityKind::ALL.to_vec();
        all.sort();
        assert_eq!(purge, all);
        assert_eq!(EntityKind::PURGE_ORDER[0], EntityKind::TeamMember);
        assert_eq!(EntityKind::PURGE_ORDER[7], EntityKind::Department);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("owner".parse::<Role>().is_err());
    }
}
