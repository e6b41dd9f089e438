use std::collections::HashSet;
use std::fmt;

use crate::config::GroupsConfig;
use crate::domain::Domain;
use crate::request::Principal;

/// Kind of identity object an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// A group
    Group,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Group => write!(f, "group"),
        }
    }
}

/// An action a caller may request on an object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create new objects
    Create,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
        }
    }
}

/// Permission decision point.
///
/// Answers whether `caller` may perform `action` on `object` inside `domain`.
pub trait PermissionGate: Send + Sync {
    /// Returns `true` to allow, `false` to deny.
    fn check(
        &self,
        caller: &Principal,
        domain: &Domain,
        object: ObjectType,
        action: Action,
    ) -> bool;
}

/// Static grant table.
///
/// Grants are keyed by principal id and apply in every domain.
///
/// ```
/// use identity_groups::{Action, Domain, ObjectType, PermissionGate, PermissionTable, Principal};
///
/// let table = PermissionTable::new().grant("uid:0", ObjectType::Group, Action::Create);
/// let local = Domain::new("LOCAL", 1000, 60000);
///
/// assert!(table.check(&Principal::named("uid:0"), &local, ObjectType::Group, Action::Create));
/// assert!(!table.check(&Principal::named("uid:1000"), &local, ObjectType::Group, Action::Create));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    grants: HashSet<(String, ObjectType, Action)>,
}

impl PermissionTable {
    /// Creates a table that denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants every configured admin group creation.
    pub fn from_config(config: &GroupsConfig) -> Self {
        config.admins.iter().fold(Self::new(), |table, admin| {
            table.grant(admin.as_str(), ObjectType::Group, Action::Create)
        })
    }

    /// Adds a grant, returning the table for chaining.
    pub fn grant(
        mut self,
        principal_id: impl Into<String>,
        object: ObjectType,
        action: Action,
    ) -> Self {
        self.grants.insert((principal_id.into(), object, action));
        self
    }
}

impl PermissionGate for PermissionTable {
    fn check(
        &self,
        caller: &Principal,
        _domain: &Domain,
        object: ObjectType,
        action: Action,
    ) -> bool {
        self.grants.contains(&(caller.id.clone(), object, action))
    }
}
