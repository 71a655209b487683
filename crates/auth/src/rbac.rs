//! RBAC resolution over the fixed role hierarchy.
//!
//! Each role carries an explicit base grant; hierarchical roles additionally
//! inherit every permission of all roles strictly below them. The full
//! role→permission table is precomputed once at first use, so
//! [`authorize`] is a pure in-memory set-membership test and can run on
//! every request with no I/O.
//!
//! Grants are applied at token issuance time only: resolution reads this
//! static table and the role baked into the presented claims, never the
//! role record a user currently points at, so permission edits are never
//! retroactive for already-issued tokens.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crate::permissions::Permission;
use crate::roles::Role;

/// Explicit (non-inherited) grants per role.
fn base_grants(role: Role) -> &'static [Permission] {
    const STUDENT: &[Permission] = &[
        Permission::from_static("lessons.read"),
        Permission::from_static("questions.read"),
        Permission::from_static("answers.create"),
        Permission::from_static("answers.read"),
    ];
    const PARENT: &[Permission] = &[
        Permission::from_static("students.read"),
        Permission::from_static("lessons.read"),
        Permission::from_static("progress.read"),
        Permission::from_static("grades.read"),
    ];
    const TEACHER: &[Permission] = &[
        Permission::from_static("lessons.create"),
        Permission::from_static("lessons.update"),
        Permission::from_static("lessons.delete"),
        Permission::from_static("questions.create"),
        Permission::from_static("questions.update"),
        Permission::from_static("questions.delete"),
        Permission::from_static("grades.create"),
        Permission::from_static("grades.update"),
    ];
    const SCHOOL_ADMIN: &[Permission] = &[
        Permission::from_static("users.create"),
        Permission::from_static("users.read"),
        Permission::from_static("users.update"),
        Permission::from_static("school.manage"),
        Permission::from_static("reports.read"),
    ];
    const SYSTEM_ADMIN: &[Permission] = &[
        Permission::from_static("organizations.manage"),
        Permission::from_static("roles.manage"),
        Permission::from_static("users.delete"),
        Permission::from_static("system.manage"),
    ];

    match role {
        Role::SystemAdmin => SYSTEM_ADMIN,
        Role::SchoolAdmin => SCHOOL_ADMIN,
        Role::Teacher => TEACHER,
        Role::Parent => PARENT,
        Role::Student => STUDENT,
    }
}

/// Precomputed role → effective-permission table (base ∪ inherited).
static RESOLVED: LazyLock<BTreeMap<Role, BTreeSet<Permission>>> = LazyLock::new(|| {
    fn collect(role: Role, into: &mut BTreeSet<Permission>) {
        into.extend(base_grants(role).iter().cloned());
        for below in role.inherits_from() {
            collect(*below, into);
        }
    }

    let mut table = BTreeMap::new();
    for role in Role::ALL {
        let mut perms = BTreeSet::new();
        collect(role, &mut perms);
        table.insert(role, perms);
    }
    table
});

/// Effective (ordered) permission set for a role, inheritance included.
pub fn permissions_for(role: Role) -> &'static BTreeSet<Permission> {
    RESOLVED
        .get(&role)
        .unwrap_or_else(|| unreachable!("table covers Role::ALL"))
}

/// Pure membership test against the resolved permission set.
pub fn authorize(role: Role, required: &Permission) -> bool {
    permissions_for(role).contains(required)
}
