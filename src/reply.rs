//! Protocol replies and the sink they are sent through.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Error;
use crate::store::StoreError;

/// Error name prefix shared by every error reply.
pub const ERROR_PREFIX: &str = "org.freedesktop.DBus.Error";

/// A reply to one method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Method return with an empty body
    Success,
    /// The caller may not perform the call; no body
    AccessDenied,
    /// Arguments or domain were rejected
    InvalidArgs(String),
    /// A group already exists
    FileExists(String),
    /// The store failed; nothing was committed
    Failed(String),
    /// The method exists but has no implementation
    NotSupported(String),
    /// The method is not part of the interface
    UnknownMethod(String),
}

impl Reply {
    /// Builds the reply for a failed call.
    ///
    /// ```
    /// use identity_groups::{Error, Reply, StoreError};
    ///
    /// let err = Error::Store(StoreError::AlreadyExists {
    ///     name: "wheel".to_string(),
    ///     domain: "LOCAL".to_string(),
    /// });
    /// assert_eq!(
    ///     Reply::from_error(&err),
    ///     Reply::FileExists("Group [wheel] already exists on domain [LOCAL]".to_string()),
    /// );
    /// ```
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Args(e) => Reply::InvalidArgs(e.message().to_string()),
            Error::Violation(v) if v.kind.is_access_denied() => Reply::AccessDenied,
            Error::Violation(v) => Reply::InvalidArgs(v.message.clone()),
            Error::Store(StoreError::AlreadyExists { name, domain }) => Reply::FileExists(
                format!("Group [{}] already exists on domain [{}]", name, domain),
            ),
            Error::Store(e) => Reply::Failed(format!("Could not create groups: {}", e)),
        }
    }

    /// Returns true for a method return.
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success)
    }

    /// Returns the fully qualified error name, or `None` for success.
    pub fn error_name(&self) -> Option<String> {
        let suffix = match self {
            Reply::Success => return None,
            Reply::AccessDenied => "AccessDenied",
            Reply::InvalidArgs(_) => "InvalidArgs",
            Reply::FileExists(_) => "FileExists",
            Reply::Failed(_) => "Failed",
            Reply::NotSupported(_) => "NotSupported",
            Reply::UnknownMethod(_) => "UnknownMethod",
        };
        Some(format!("{}.{}", ERROR_PREFIX, suffix))
    }

    /// Returns the error message carried in the body, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Reply::Success | Reply::AccessDenied => None,
            Reply::InvalidArgs(m)
            | Reply::FileExists(m)
            | Reply::Failed(m)
            | Reply::NotSupported(m)
            | Reply::UnknownMethod(m) => Some(m),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.error_name(), self.message()) {
            (None, _) => write!(f, "method return"),
            (Some(name), None) => write!(f, "{}", name),
            (Some(name), Some(message)) => write!(f, "{}: {}", name, message),
        }
    }
}

/// Destination for replies, implemented by the bus connection.
pub trait ReplySink: Send + Sync {
    /// Sends `reply` for the call identified by `request_id`.
    fn send(&self, request_id: &str, reply: Reply);
}

/// A [`ReplySink`] that keeps every reply in memory.
#[derive(Debug, Default)]
pub struct ReplyLog {
    sent: Mutex<Vec<(String, Reply)>>,
}

impl ReplyLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, Reply)>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every `(request_id, reply)` pair in send order.
    pub fn sent(&self) -> Vec<(String, Reply)> {
        self.lock().clone()
    }

    /// Returns the replies sent for one request.
    pub fn replies_for(&self, request_id: &str) -> Vec<Reply> {
        self.lock()
            .iter()
            .filter(|(id, _)| id == request_id)
            .map(|(_, reply)| reply.clone())
            .collect()
    }
}

impl ReplySink for ReplyLog {
    fn send(&self, request_id: &str, reply: Reply) {
        self.lock().push((request_id.to_string(), reply));
    }
}
