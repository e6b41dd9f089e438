use crate::call::CreateGroupsArgs;
use crate::domain::Domain;
use crate::request::{Principal, RequestMeta};
use crate::state::{Admitted, Unchecked};

/// The unit of work for one `CreateGroups` call.
///
/// `BatchCreateRequest<S>` is generic over its admission state:
/// - `BatchCreateRequest<Unchecked>`: parsed arguments, nothing verified
/// - `BatchCreateRequest<Admitted>`: domain resolved and creation permitted
///
/// ```text
/// BatchCreateRequest<Unchecked> --AdmissionGate::admit--> BatchCreateRequest<Admitted>
/// ```
///
/// Only an admitted request can be handed to [`BatchDriver`](crate::BatchDriver),
/// so the store is never reached with an unresolved domain.
///
/// # Examples
///
/// ```
/// use identity_groups::{BatchCreateRequest, CreateGroupsArgs, Principal, RequestMeta};
///
/// let meta = RequestMeta {
///     request_id: "req-7".to_string(),
///     principal: Some(Principal::named("uid:0")),
/// };
/// let args = CreateGroupsArgs {
///     names: vec!["wheel".to_string(), "audio".to_string()],
///     domain: "local".to_string(),
/// };
///
/// let request = BatchCreateRequest::new(meta, args);
/// assert_eq!(request.requested_domain(), "local");
/// assert_eq!(request.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BatchCreateRequest<S = Admitted> {
    request_id: String,
    names: Vec<String>,
    state: S,
}

impl<S> BatchCreateRequest<S> {
    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the group names in creation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of groups in the batch.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true for a batch with no names.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl BatchCreateRequest<Unchecked> {
    /// Creates an unchecked request from call metadata and parsed arguments.
    pub fn new(meta: RequestMeta, args: CreateGroupsArgs) -> Self {
        Self {
            request_id: meta.request_id,
            names: args.names,
            state: Unchecked {
                requester: meta.principal,
                requested_domain: args.domain,
            },
        }
    }

    /// Returns the domain exactly as the caller spelled it.
    pub fn requested_domain(&self) -> &str {
        &self.state.requested_domain
    }

    /// Returns the caller, if the transport identified one.
    pub fn requester(&self) -> Option<&Principal> {
        self.state.requester.as_ref()
    }

    /// Moves the request to `Admitted`.
    ///
    /// `pub(crate)` so that only the admission gate performs the transition.
    pub(crate) fn admit(
        self,
        requester: Principal,
        domain: Domain,
    ) -> BatchCreateRequest<Admitted> {
        BatchCreateRequest {
            request_id: self.request_id,
            names: self.names,
            state: Admitted { requester, domain },
        }
    }
}

impl BatchCreateRequest<Admitted> {
    /// Returns the verified caller.
    pub fn requester(&self) -> &Principal {
        &self.state.requester
    }

    /// Returns the resolved domain.
    pub fn domain(&self) -> &Domain {
        &self.state.domain
    }
}
