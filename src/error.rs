use std::fmt;

use crate::call::ArgError;
use crate::policy::{Action, ObjectType};
use crate::store::StoreError;

/// Errors that can occur while serving a groups call.
#[derive(Debug)]
pub enum Error {
    /// The call arguments could not be unmarshaled
    Args(ArgError),
    /// The request was refused before touching the store
    Violation(Violation),
    /// The identity store reported a failure
    Store(StoreError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Args(e) => write!(f, "Invalid arguments: {}", e),
            Error::Violation(v) => write!(f, "Request refused: {}", v),
            Error::Store(e) => write!(f, "Store failure: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Args(e) => Some(e),
            Error::Violation(v) => Some(v),
            Error::Store(e) => Some(e),
        }
    }
}

impl From<ArgError> for Error {
    fn from(e: ArgError) -> Self {
        Error::Args(e)
    }
}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        Error::Violation(v)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

/// A refused request with details about which check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for the invalid-domain violation every domain check produces.
    pub fn invalid_domain() -> Self {
        Self::new(ViolationKind::InvalidDomain, "Invalid domain.")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Violation {}

/// The kind of admission failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The transport could not identify the caller
    Unauthenticated,
    /// The domain is not accepted for this operation or does not exist
    InvalidDomain,
    /// The batch or its arguments are outside configured limits
    InvalidArguments,
    /// The permission gate refused the action
    Denied {
        /// Object type the action targeted
        object: ObjectType,
        /// The action that was refused
        action: Action,
    },
}

impl ViolationKind {
    /// Returns true when the caller should see an access-denied reply.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            ViolationKind::Unauthenticated | ViolationKind::Denied { .. }
        )
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Unauthenticated => write!(f, "Unauthenticated"),
            ViolationKind::InvalidDomain => write!(f, "Invalid domain"),
            ViolationKind::InvalidArguments => write!(f, "Invalid arguments"),
            ViolationKind::Denied { object, action } => {
                write!(f, "Denied '{}' on '{}'", action, object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_domain_carries_caller_message() {
        let v = Violation::invalid_domain();
        assert_eq!(v.kind, ViolationKind::InvalidDomain);
        assert_eq!(v.message, "Invalid domain.");
        assert!(!v.kind.is_access_denied());
    }

    #[test]
    fn denied_and_unauthenticated_map_to_access_denied() {
        let denied = ViolationKind::Denied {
            object: ObjectType::Group,
            action: Action::Create,
        };
        assert!(denied.is_access_denied());
        assert!(ViolationKind::Unauthenticated.is_access_denied());
        assert_eq!(denied.to_string(), "Denied 'create' on 'group'");
    }

    #[test]
    fn error_wraps_sources() {
        let err: Error = Violation::invalid_domain().into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Request refused"));
    }
}
