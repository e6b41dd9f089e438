//! Type-state for batch requests.
//!
//! A [`BatchCreateRequest`](crate::BatchCreateRequest) starts `Unchecked`,
//! holding the domain exactly as the caller spelled it. Only
//! [`AdmissionGate`](crate::AdmissionGate) can move it to `Admitted`, which
//! carries the resolved domain and the verified requester.

use crate::domain::Domain;
use crate::request::Principal;

/// State of a request whose domain and permissions have not been checked.
#[derive(Debug, Clone)]
pub struct Unchecked {
    pub(crate) requester: Option<Principal>,
    pub(crate) requested_domain: String,
}

/// State of a request that passed domain resolution and the permission gate.
///
/// Code outside this crate cannot build one directly:
///
/// ```compile_fail
/// use identity_groups::{Admitted, Domain, Principal};
///
/// let forged = Admitted {
///     requester: Principal::named("uid:0"),
///     domain: Domain::new("LOCAL", 1000, 60000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Admitted {
    pub(crate) requester: Principal,
    pub(crate) domain: Domain,
}
