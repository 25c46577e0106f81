use std::collections::BTreeSet;

use colonycore_base::EntityId;
use serde::{Deserialize, Serialize};

/// An open-ended role name. The spec never enumerates a closed role set, and a
/// plugin-extensible RBAC surface can't be a closed Rust enum without turning every new
/// deployment-defined role into a recompile — so `Role` stays a newtype over `String` rather
/// than an enum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(pub String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Role(name.into())
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role(s.to_string())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The RBAC context carried through a dataset run (and, more generally, any service
/// operation that wants it) as a hint for a runner's own filtering. The core never enforces
/// these — see `colonycore-dataset`'s `Scope` usage in `RunRequest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub requestor: String,
    pub roles: BTreeSet<Role>,
    pub project_ids: BTreeSet<EntityId>,
    pub protocol_ids: BTreeSet<EntityId>,
}

impl Scope {
    pub fn new(requestor: impl Into<String>) -> Self {
        Scope { requestor: requestor.into(), ..Default::default() }
    }

    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn with_project(mut self, project_id: EntityId) -> Self {
        self.project_ids.insert(project_id);
        self
    }

    pub fn with_protocol(mut self, protocol_id: EntityId) -> Self {
        self.protocol_ids.insert(protocol_id);
        self
    }

    pub fn has_role(&self, role: impl Into<Role>) -> bool {
        self.roles.contains(&role.into())
    }

    /// Convenience for callers that model a superuser role as a named role rather than a
    /// distinct boolean field; "root" is a convention, not something the core checks anywhere.
    pub fn is_root(&self) -> bool {
        self.has_role("root")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_accumulates_roles_and_ids() {
        let scope = Scope::new("alice").with_role("curator").with_role("root").with_project(EntityId::new("proj-1"));
        assert!(scope.has_role("curator"));
        assert!(scope.is_root());
        assert_eq!(scope.project_ids.len(), 1);
    }

    #[test]
    fn default_scope_has_no_roles() {
        let scope = Scope::default();
        assert!(!scope.is_root());
    }
}
