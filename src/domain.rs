//! Administrative domains and the registry that resolves them by name.

use std::collections::BTreeMap;
use std::fmt;

/// Handle to an administrative partition of the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    min_id: u32,
    max_id: u32,
}

impl Domain {
    /// Creates a domain whose ids are allocated from `min_id..=max_id`.
    pub fn new(name: impl Into<String>, min_id: u32, max_id: u32) -> Self {
        Self {
            name: name.into(),
            min_id,
            max_id,
        }
    }

    /// Returns the canonical domain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowest id the store may allocate in this domain.
    pub fn min_id(&self) -> u32 {
        self.min_id
    }

    /// Highest id the store may allocate in this domain.
    pub fn max_id(&self) -> u32 {
        self.max_id
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Read-only lookup from domain name to domain handle.
pub trait DomainRegistry: Send + Sync {
    /// Resolves `name` exactly as spelled.
    fn lookup(&self, name: &str) -> Option<Domain>;
}

/// Ordered in-memory domain registry.
///
/// ```
/// use identity_groups::{Domain, DomainMap, DomainRegistry};
///
/// let mut domains = DomainMap::new();
/// domains.insert(Domain::new("LOCAL", 1000, 60000));
///
/// assert!(domains.lookup("LOCAL").is_some());
/// assert!(domains.lookup("REMOTE").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DomainMap {
    domains: BTreeMap<String, Domain>,
}

impl DomainMap {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a domain, keyed by its name.
    pub fn insert(&mut self, domain: Domain) {
        self.domains.insert(domain.name.clone(), domain);
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, domain: Domain) -> Self {
        self.insert(domain);
        self
    }

    /// Number of registered domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Returns true if no domain is registered.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl DomainRegistry for DomainMap {
    fn lookup(&self, name: &str) -> Option<Domain> {
        self.domains.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        let domains = DomainMap::new().with(Domain::new("LOCAL", 1000, 2000));

        assert_eq!(domains.lookup("LOCAL").unwrap().min_id(), 1000);
        assert!(domains.lookup("local").is_none());
        assert_eq!(domains.len(), 1);
    }

    #[test]
    fn insert_replaces_same_name() {
        let mut domains = DomainMap::new();
        domains.insert(Domain::new("LOCAL", 1, 2));
        domains.insert(Domain::new("LOCAL", 10, 20));

        assert_eq!(domains.len(), 1);
        assert_eq!(domains.lookup("LOCAL").unwrap().max_id(), 20);
    }
}
