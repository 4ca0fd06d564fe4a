use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::{CallerIdentity, Permission, PermissionVerb, Resource, Role};

/// Total mapping from role to its fixed grant set.
///
/// Grant sets are fixed at configuration time; there is no per-user
/// override. Roles absent from the map (and absent roles altogether)
/// resolve to the empty set.
#[derive(Debug, Clone)]
pub struct RoleGrants {
    grants: BTreeMap<Role, BTreeSet<Permission>>,
    empty: BTreeSet<Permission>,
}

impl RoleGrants {
    /// Returns the built-in console grant table.
    #[must_use]
    pub fn builtin() -> Self {
        let mut grants = BTreeMap::new();

        let mut admin = BTreeSet::new();
        for resource in [
            Resource::Users,
            Resource::Jobs,
            Resource::Templates,
            Resource::Cms,
            Resource::Tickets,
            Resource::Tracks,
        ] {
            grant(&mut admin, resource, FULL_ACCESS);
        }
        grant(&mut admin, Resource::Flags, READ_WRITE);
        grant(&mut admin, Resource::Analytics, READ_ONLY);
        grant(&mut admin, Resource::Audit, READ_ONLY);
        grants.insert(Role::Admin, admin);

        let mut moderator = BTreeSet::new();
        grant(&mut moderator, Resource::Users, READ_WRITE);
        grant(&mut moderator, Resource::Jobs, READ_WRITE);
        grants.insert(Role::Moderator, moderator);

        let mut analyst = BTreeSet::new();
        grant(&mut analyst, Resource::Users, READ_ONLY);
        grant(&mut analyst, Resource::Jobs, READ_ONLY);
        grant(&mut analyst, Resource::Analytics, READ_ONLY);
        grant(&mut analyst, Resource::Audit, READ_ONLY);
        grants.insert(Role::Analyst, analyst);

        let mut support = BTreeSet::new();
        grant(&mut support, Resource::Users, READ_ONLY);
        grant(&mut support, Resource::Tickets, READ_WRITE);
        grants.insert(Role::Support, support);

        let mut reader = BTreeSet::new();
        for resource in [
            Resource::Users,
            Resource::Jobs,
            Resource::Templates,
            Resource::Cms,
            Resource::Tickets,
            Resource::Tracks,
            Resource::Flags,
        ] {
            grant(&mut reader, resource, READ_ONLY);
        }
        grants.insert(Role::Reader, reader);

        Self {
            grants,
            empty: BTreeSet::new(),
        }
    }

    /// Builds a grant table from string tokens, validating at configuration
    /// time that every token is well-formed and that each verb sibling a
    /// handler might derive from it parses too.
    ///
    /// Roles missing from `entries` get an empty grant set, keeping the
    /// mapping total.
    pub fn from_entries(entries: Vec<(Role, Vec<String>)>) -> AppResult<Self> {
        let mut grants: BTreeMap<Role, BTreeSet<Permission>> = Role::all()
            .iter()
            .map(|role| (*role, BTreeSet::new()))
            .collect();

        for (role, tokens) in entries {
            let set = grants.entry(role).or_default();
            for token in tokens {
                let permission = Permission::parse(token.as_str())?;
                for verb in [
                    PermissionVerb::Read,
                    PermissionVerb::Write,
                    PermissionVerb::Delete,
                ] {
                    Permission::parse(permission.with_verb(verb).as_str()).map_err(|error| {
                        AppError::Validation(format!(
                            "grant '{token}' for role '{}' has a malformed '{}' sibling: {error}",
                            role.as_str(),
                            verb.as_str()
                        ))
                    })?;
                }
                set.insert(permission);
            }
        }

        Ok(Self {
            grants,
            empty: BTreeSet::new(),
        })
    }

    /// Returns the grant set for a role; unknown or absent roles get the
    /// empty set.
    #[must_use]
    pub fn grants_for(&self, role: Option<Role>) -> &BTreeSet<Permission> {
        role.and_then(|role| self.grants.get(&role))
            .unwrap_or(&self.empty)
    }
}

fn grant(set: &mut BTreeSet<Permission>, resource: Resource, verbs: &[PermissionVerb]) {
    for verb in verbs {
        set.insert(Permission::new(resource, *verb));
    }
}

const FULL_ACCESS: &[PermissionVerb] = &[
    PermissionVerb::Read,
    PermissionVerb::Write,
    PermissionVerb::Delete,
];
const READ_WRITE: &[PermissionVerb] = &[PermissionVerb::Read, PermissionVerb::Write];
const READ_ONLY: &[PermissionVerb] = &[PermissionVerb::Read];

/// Authorization guard evaluating callers against the grant table.
///
/// Checks are pure functions of the caller's role and the fixed grant
/// table; there is no shared mutable state and no locking. Every mutating
/// service method calls [`AuthorizationService::require`] itself; UI-level
/// affordance gating via [`AuthorizationService::is_read_only`] is advisory
/// only.
#[derive(Clone)]
pub struct AuthorizationService {
    grants: Arc<RoleGrants>,
}

impl AuthorizationService {
    /// Creates a guard over a grant table.
    #[must_use]
    pub fn new(grants: RoleGrants) -> Self {
        Self {
            grants: Arc::new(grants),
        }
    }

    /// Returns the grant set for the caller's role.
    #[must_use]
    pub fn grants_for(&self, role: Option<Role>) -> &BTreeSet<Permission> {
        self.grants.grants_for(role)
    }

    /// Returns whether the caller holds the permission.
    #[must_use]
    pub fn has_permission(&self, caller: &CallerIdentity, permission: &Permission) -> bool {
        self.grants.grants_for(caller.role()).contains(permission)
    }

    /// Returns whether the caller holds any of the permissions.
    ///
    /// An empty slice yields `false`; callers treat an empty requirement
    /// list as "no restriction" and skip the check entirely.
    #[must_use]
    pub fn has_any(&self, caller: &CallerIdentity, permissions: &[Permission]) -> bool {
        permissions
            .iter()
            .any(|permission| self.has_permission(caller, permission))
    }

    /// Returns whether the caller holds all of the permissions.
    ///
    /// An empty slice yields `true` (vacuous truth).
    #[must_use]
    pub fn has_all(&self, caller: &CallerIdentity, permissions: &[Permission]) -> bool {
        permissions
            .iter()
            .all(|permission| self.has_permission(caller, permission))
    }

    /// Returns whether the caller may write to the resource named by a base
    /// permission, derived via verb substitution.
    #[must_use]
    pub fn can_write(&self, caller: &CallerIdentity, base: &Permission) -> bool {
        self.has_permission(caller, &base.with_verb(PermissionVerb::Write))
    }

    /// Returns whether the caller may delete the resource named by a base
    /// permission, derived via verb substitution.
    #[must_use]
    pub fn can_delete(&self, caller: &CallerIdentity, base: &Permission) -> bool {
        self.has_permission(caller, &base.with_verb(PermissionVerb::Delete))
    }

    /// Returns whether the caller's entire grant set carries no write or
    /// delete capability, or the caller has no recognized role.
    ///
    /// Advisory: used to disable UI affordances, never as the sole gate in
    /// front of a mutating handler.
    #[must_use]
    pub fn is_read_only(&self, caller: &CallerIdentity) -> bool {
        if caller.role().is_none() {
            return true;
        }

        !self
            .grants
            .grants_for(caller.role())
            .iter()
            .any(|permission| {
                matches!(
                    permission.verb(),
                    PermissionVerb::Write | PermissionVerb::Delete
                )
            })
    }

    /// Ensures the caller holds the permission.
    ///
    /// Denial mutates nothing and writes no audit record; identical inputs
    /// always produce the identical decision.
    pub fn require(&self, caller: &CallerIdentity, permission: &Permission) -> AppResult<()> {
        if self.has_permission(caller, permission) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing permission '{}'",
            caller.subject(),
            permission.as_str()
        )))
    }
}
