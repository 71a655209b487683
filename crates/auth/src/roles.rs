//! Fixed role hierarchy.
//!
//! Roles are a closed set with a fixed partial order rather than dynamic,
//! storage-backed records: authorization runs on every request and must not
//! do I/O or dynamic dispatch. The order is
//! `system_admin ⊇ school_admin ⊇ teacher ⊇ {parent, student}`; parent and
//! student are independent leaves (a parent is not a student and vice versa).

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use learngate_core::DomainError;

/// Role held by a user. Exactly one role per user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SystemAdmin,
    SchoolAdmin,
    Teacher,
    Parent,
    Student,
}

impl Role {
    /// All roles, highest first.
    pub const ALL: [Role; 5] = [
        Role::SystemAdmin,
        Role::SchoolAdmin,
        Role::Teacher,
        Role::Parent,
        Role::Student,
    ];

    /// Roles directly below this one in the fixed hierarchy.
    ///
    /// Transitive closure is taken by the RBAC resolver; this table only
    /// encodes the immediate edges.
    pub fn inherits_from(self) -> &'static [Role] {
        match self {
            Role::SystemAdmin => &[Role::SchoolAdmin],
            Role::SchoolAdmin => &[Role::Teacher],
            Role::Teacher => &[Role::Parent, Role::Student],
            Role::Parent | Role::Student => &[],
        }
    }

    /// Stable wire name (matches the `role` claim in issued tokens).
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SystemAdmin => "system_admin",
            Role::SchoolAdmin => "school_admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
            Role::Student => "student",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system_admin" => Ok(Role::SystemAdmin),
            "school_admin" => Ok(Role::SchoolAdmin),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            "student" => Ok(Role::Student),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_name() {
        for role in Role::ALL {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn parent_and_student_are_leaves() {
        assert!(Role::Parent.inherits_from().is_empty());
        assert!(Role::Student.inherits_from().is_empty());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&Role::SchoolAdmin).unwrap();
        assert_eq!(json, "\"school_admin\"");
    }
}
