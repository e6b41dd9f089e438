//! Audit event schema and types.

use std::fmt;

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Every requested change was committed
    Success,
    /// The caller was not allowed to perform the operation
    Denied,
    /// The arguments or domain were rejected before touching the store
    Rejected,
    /// A name collided and the transaction was rolled back
    Conflict,
    /// The store failed and the transaction was rolled back
    Error,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Denied => write!(f, "denied"),
            AuditOutcome::Rejected => write!(f, "rejected"),
            AuditOutcome::Conflict => write!(f, "conflict"),
            AuditOutcome::Error => write!(f, "error"),
        }
    }
}

/// A structured audit record for one administrative call.
///
/// # Example
///
/// ```
/// use identity_groups::audit::{AuditEvent, AuditOutcome};
///
/// let event = AuditEvent::new("req-123", Some("uid:0"), "create_groups", AuditOutcome::Success)
///     .with_domain("LOCAL")
///     .with_affected(2);
///
/// assert_eq!(event.request_id(), "req-123");
/// assert_eq!(event.principal(), Some("uid:0"));
/// assert_eq!(event.affected(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Request identifier for correlation
    request_id: String,
    /// Caller id, None when the transport could not identify one
    principal: Option<String>,
    /// Operation name, e.g. "create_groups"
    action: String,
    /// Resolved domain, None when rejected before resolution
    domain: Option<String>,
    outcome: AuditOutcome,
    /// Number of objects committed
    affected: usize,
}

impl AuditEvent {
    /// Creates a new audit event with required fields.
    pub fn new(
        request_id: impl Into<String>,
        principal: Option<impl Into<String>>,
        action: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            principal: principal.map(Into::into),
            action: action.into(),
            domain: None,
            outcome,
            affected: 0,
        }
    }

    /// Sets the domain the operation targeted.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the number of objects committed.
    pub fn with_affected(mut self, affected: usize) -> Self {
        self.affected = affected;
        self
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the principal, if present.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the operation name.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the domain, if resolved.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the number of objects committed.
    pub fn affected(&self) -> usize {
        self.affected
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[action={}, outcome={}, request_id={}, principal={}",
            self.action,
            self.outcome,
            self.request_id,
            self.principal.as_deref().unwrap_or("<none>")
        )?;

        if let Some(domain) = &self.domain {
            write!(f, ", domain={}", domain)?;
        }

        write!(f, ", affected={}]", self.affected)
    }
}
