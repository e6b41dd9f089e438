/// Metadata about an incoming call.
///
/// Contains the correlation identifier and the caller identity as supplied
/// by the transport layer.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Unique identifier for this call
    pub request_id: String,
    /// Identified caller, if the transport could resolve one
    pub principal: Option<Principal>,
}

/// The identity of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    /// Stable identifier (bus sender or uid)
    pub id: String,
    /// Display name
    pub name: String,
}

impl Principal {
    /// Creates a principal whose display name equals its id.
    pub fn named(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
        }
    }
}
