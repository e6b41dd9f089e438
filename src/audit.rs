//! Audit trail for administrative group operations.
//!
//! This module provides:
//! - `AuditEvent`: Structured record of one terminal outcome
//! - `AuditTrail`: In-memory audit event recorder
//! - [`emit`]: Writes an event through `tracing` on the `groups_audit` target
//!
//! Events carry identifiers and counts only, never group member data.

mod event;
mod trail;

pub use event::{AuditEvent, AuditOutcome};
pub use trail::AuditTrail;

/// Emits an audit event as a structured tracing record.
pub fn emit(event: &AuditEvent) {
    tracing::info!(
        target: "groups_audit",
        request_id = %event.request_id(),
        principal = ?event.principal(),
        action = %event.action(),
        domain = ?event.domain(),
        outcome = %event.outcome(),
        affected = event.affected(),
        "audit event"
    );
}

/// Emits an audit event and also records it to the provided trail.
pub fn emit_and_record(event: AuditEvent, trail: &AuditTrail) {
    emit(&event);
    trail.record(event);
}
