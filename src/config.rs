//! Configuration for the groups interface.
//!
//! Loaded by the hosting daemon from its own config source and handed to
//! [`GroupsService`](crate::GroupsService) at construction. Every field has a
//! default so a partial document deserializes.
//!
//! ```
//! use identity_groups::GroupsConfig;
//!
//! let config = GroupsConfig::default();
//! assert!(config.accepts_create_on("local").is_some());
//! assert!(config.accepts_create_on("corp.example.com").is_none());
//! ```

use serde::{Deserialize, Serialize};

/// Settings for group provisioning.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GroupsConfig {
    /// Domains that accept `CreateGroups`, matched case-insensitively
    #[serde(default = "default_create_domains")]
    pub create_domains: Vec<String>,

    /// Upper bound on names in a single `CreateGroups` call
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Principal ids granted group creation by the default permission table
    #[serde(default)]
    pub admins: Vec<String>,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self {
            create_domains: default_create_domains(),
            max_batch_size: default_max_batch_size(),
            admins: Vec::new(),
        }
    }
}

fn default_create_domains() -> Vec<String> {
    vec!["LOCAL".to_string()]
}

fn default_max_batch_size() -> usize {
    1024
}

impl GroupsConfig {
    /// Returns the configured spelling of `domain` if it accepts creation.
    ///
    /// Comparison is ASCII case-insensitive.
    pub fn accepts_create_on(&self, domain: &str) -> Option<&str> {
        self.create_domains
            .iter()
            .find(|d| d.eq_ignore_ascii_case(domain))
            .map(String::as_str)
    }
}
