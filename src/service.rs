//! The groups interface: method routing and per-call orchestration.
//!
//! # Integration Flow
//!
//! ```text
//! MethodCall
//!   ↓
//! create_groups_args()          -- ArgError → InvalidArgs
//!   ↓
//! BatchCreateRequest<Unchecked>
//!   ↓
//! AdmissionGate::admit()        -- Violation → InvalidArgs / AccessDenied
//!   ↓
//! BatchCreateRequest<Admitted>
//!   ↓
//! BatchDriver::run()            -- StoreError → FileExists / Failed
//!   ↓
//! Reply → ReplySink
//! ```

use std::str::FromStr;
use std::sync::Arc;

use crate::audit::{self, AuditEvent, AuditOutcome, AuditTrail};
use crate::batch::{BatchDriver, BatchSummary};
use crate::call::{ExtractMetadata, MethodCall};
use crate::config::GroupsConfig;
use crate::context::BatchCreateRequest;
use crate::domain::DomainRegistry;
use crate::error::Error;
use crate::gate::AdmissionGate;
use crate::logging::RequestLog;
use crate::policy::PermissionGate;
use crate::reply::{Reply, ReplySink};
use crate::store::{GroupStore, StoreError};

const NOT_IMPLEMENTED: &str = "Not yet implemented";

/// Methods of the groups interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Create a batch of groups atomically
    CreateGroups,
    /// Delete groups
    DeleteGroups,
    /// Add members to a group
    AddMembers,
    /// Remove members from a group
    RemoveMembers,
    /// Change a group's gid
    SetGid,
}

impl Method {
    /// Returns the bus method name.
    pub fn name(&self) -> &'static str {
        match self {
            Method::CreateGroups => "CreateGroups",
            Method::DeleteGroups => "DeleteGroups",
            Method::AddMembers => "AddMembers",
            Method::RemoveMembers => "RemoveMembers",
            Method::SetGid => "SetGid",
        }
    }
}

impl FromStr for Method {
    type Err = Reply;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreateGroups" => Ok(Method::CreateGroups),
            "DeleteGroups" => Ok(Method::DeleteGroups),
            "AddMembers" => Ok(Method::AddMembers),
            "RemoveMembers" => Ok(Method::RemoveMembers),
            "SetGid" => Ok(Method::SetGid),
            other => Err(Reply::UnknownMethod(format!(
                "No such method '{}' on the groups interface",
                other
            ))),
        }
    }
}

/// The groups interface with its collaborators injected.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use identity_groups::{
///     Arg, Domain, DomainMap, GroupsConfig, GroupsService, MemoryStore, MethodCall,
///     PermissionTable, Principal, Reply,
/// };
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let config = GroupsConfig { admins: vec!["uid:0".to_string()], ..GroupsConfig::default() };
/// let permissions = PermissionTable::from_config(&config);
/// let domains = DomainMap::new().with(Domain::new("LOCAL", 1000, 60000));
/// let store = Arc::new(MemoryStore::new());
/// let service = GroupsService::new(config, domains, permissions, Arc::clone(&store));
///
/// let call = MethodCall::new("req-1")
///     .with_caller(Principal::named("uid:0"))
///     .with_arg(Arg::StrArray(vec!["wheel".to_string(), "audio".to_string()]))
///     .with_arg(Arg::Str("LOCAL".to_string()));
///
/// assert_eq!(service.create_groups(&call).await, Reply::Success);
/// assert!(store.contains("LOCAL", "audio"));
/// # });
/// ```
pub struct GroupsService<S: GroupStore> {
    config: GroupsConfig,
    registry: Box<dyn DomainRegistry>,
    permissions: Box<dyn PermissionGate>,
    store: Arc<S>,
    audit_trail: Option<Arc<AuditTrail>>,
}

impl<S: GroupStore> GroupsService<S> {
    /// Creates a service over the given collaborators.
    pub fn new(
        config: GroupsConfig,
        registry: impl DomainRegistry + 'static,
        permissions: impl PermissionGate + 'static,
        store: Arc<S>,
    ) -> Self {
        Self {
            config,
            registry: Box::new(registry),
            permissions: Box::new(permissions),
            store,
            audit_trail: None,
        }
    }

    /// Records audit events to `trail` in addition to emitting them.
    pub fn with_audit_trail(mut self, trail: Arc<AuditTrail>) -> Self {
        self.audit_trail = Some(trail);
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &GroupsConfig {
        &self.config
    }

    /// Returns the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Routes `call` to `method` and sends the reply through `sink`.
    pub async fn handle(&self, method: &str, call: &MethodCall, sink: &dyn ReplySink) {
        let reply = match method.parse::<Method>() {
            Ok(method) => self.dispatch(method, call).await,
            Err(reply) => reply,
        };
        sink.send(call.request_id(), reply);
    }

    /// Runs `method` and returns its reply.
    pub async fn dispatch(&self, method: Method, call: &MethodCall) -> Reply {
        match method {
            Method::CreateGroups => self.create_groups(call).await,
            Method::DeleteGroups => self.delete_groups(call),
            Method::AddMembers => self.add_members(call),
            Method::RemoveMembers => self.remove_members(call),
            Method::SetGid => self.set_gid(call),
        }
    }

    /// Creates every group named in `call`, or none of them.
    pub async fn create_groups(&self, call: &MethodCall) -> Reply {
        let log = RequestLog::new(call.request_id(), Method::CreateGroups.name());

        let result = self.try_create_groups(call, &log).await;
        let caller = call.caller().map(|p| p.id.as_str());
        let event = audit_event(call.request_id(), caller, &result);
        match &self.audit_trail {
            Some(trail) => audit::emit_and_record(event, trail),
            None => audit::emit(&event),
        }

        match result {
            Ok(summary) => {
                log.info(format_args!(
                    "Created {} groups on domain [{}]",
                    summary.created.len(),
                    summary.domain
                ));
                Reply::Success
            }
            Err(err) => {
                match &err {
                    Error::Store(e) if !e.is_conflict() => {
                        log.error(format_args!("CreateGroups failed: {}", err))
                    }
                    _ => log.info(format_args!("CreateGroups refused: {}", err)),
                }
                Reply::from_error(&err)
            }
        }
    }

    async fn try_create_groups(
        &self,
        call: &MethodCall,
        log: &RequestLog<'_>,
    ) -> Result<BatchSummary, Error> {
        let args = call.create_groups_args().map_err(|e| {
            log.warn(format_args!("Parsing arguments failed: {}", e));
            e
        })?;
        let request = BatchCreateRequest::new(call.extract_metadata(), args);

        let gate = AdmissionGate::new(
            &self.config,
            self.registry.as_ref(),
            self.permissions.as_ref(),
        );
        let request = gate.admit(request)?;

        BatchDriver::new(self.store.as_ref()).run(&request, log).await
    }

    /// `DeleteGroups` is not supported.
    pub fn delete_groups(&self, call: &MethodCall) -> Reply {
        not_supported(call, Method::DeleteGroups)
    }

    /// `AddMembers` is not supported.
    pub fn add_members(&self, call: &MethodCall) -> Reply {
        not_supported(call, Method::AddMembers)
    }

    /// `RemoveMembers` is not supported.
    pub fn remove_members(&self, call: &MethodCall) -> Reply {
        not_supported(call, Method::RemoveMembers)
    }

    /// `SetGid` is not supported.
    pub fn set_gid(&self, call: &MethodCall) -> Reply {
        not_supported(call, Method::SetGid)
    }
}

fn not_supported(call: &MethodCall, method: Method) -> Reply {
    RequestLog::new(call.request_id(), method.name())
        .debug(format_args!("Method not supported"));
    Reply::NotSupported(NOT_IMPLEMENTED.to_string())
}

fn audit_event(
    request_id: &str,
    principal: Option<&str>,
    result: &Result<BatchSummary, Error>,
) -> AuditEvent {
    let outcome = match result {
        Ok(_) => AuditOutcome::Success,
        Err(Error::Args(_)) => AuditOutcome::Rejected,
        Err(Error::Violation(v)) if v.kind.is_access_denied() => AuditOutcome::Denied,
        Err(Error::Violation(_)) => AuditOutcome::Rejected,
        Err(Error::Store(StoreError::AlreadyExists { .. })) => AuditOutcome::Conflict,
        Err(Error::Store(_)) => AuditOutcome::Error,
    };
    let event = AuditEvent::new(request_id, principal, "create_groups", outcome);
    match result {
        Ok(summary) => event
            .with_domain(summary.domain.as_str())
            .with_affected(summary.created.len()),
        Err(Error::Store(StoreError::AlreadyExists { domain, .. })) => {
            event.with_domain(domain.as_str())
        }
        Err(_) => event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Arg;
    use crate::domain::{Domain, DomainMap};
    use crate::memory::MemoryStore;
    use crate::policy::PermissionTable;
    use crate::reply::ReplyLog;
    use crate::request::Principal;

    fn service() -> GroupsService<MemoryStore> {
        let config = GroupsConfig {
            admins: vec!["uid:0".to_string()],
            ..GroupsConfig::default()
        };
        let permissions = PermissionTable::from_config(&config);
        GroupsService::new(
            config,
            DomainMap::new().with(Domain::new("LOCAL", 1000, 60000)),
            permissions,
            Arc::new(MemoryStore::new()),
        )
    }

    fn create_call(caller: &str, names: &[&str], domain: &str) -> MethodCall {
        MethodCall::new("req-svc")
            .with_caller(Principal::named(caller))
            .with_arg(Arg::StrArray(names.iter().map(|n| n.to_string()).collect()))
            .with_arg(Arg::Str(domain.to_string()))
    }

    #[test]
    fn method_names_round_trip() {
        for method in [
            Method::CreateGroups,
            Method::DeleteGroups,
            Method::AddMembers,
            Method::RemoveMembers,
            Method::SetGid,
        ] {
            assert_eq!(method.name().parse::<Method>().unwrap(), method);
        }
        assert!(matches!(
            "DropGroups".parse::<Method>(),
            Err(Reply::UnknownMethod(_))
        ));
    }

    #[tokio::test]
    async fn stubs_reply_not_supported() {
        let service = service();
        let call = MethodCall::new("req-stub");

        for method in [
            Method::DeleteGroups,
            Method::AddMembers,
            Method::RemoveMembers,
            Method::SetGid,
        ] {
            assert_eq!(
                service.dispatch(method, &call).await,
                Reply::NotSupported("Not yet implemented".to_string())
            );
        }
        assert!(service.store().journal().is_empty());
    }

    #[tokio::test]
    async fn bad_arguments_reply_invalid_args() {
        let service = service();
        let call = MethodCall::new("req-args").with_caller(Principal::named("uid:0"));

        let reply = service.create_groups(&call).await;
        assert!(matches!(reply, Reply::InvalidArgs(_)));
        assert!(service.store().journal().is_empty());
    }

    #[tokio::test]
    async fn denied_caller_never_reaches_store() {
        let service = service();
        let reply = service
            .create_groups(&create_call("uid:1000", &["a"], "LOCAL"))
            .await;

        assert_eq!(reply, Reply::AccessDenied);
        assert!(service.store().journal().is_empty());
    }

    #[tokio::test]
    async fn conflict_reply_names_group_and_domain() {
        let service = service();
        service.store().seed("LOCAL", "b", 4000);

        let reply = service
            .create_groups(&create_call("uid:0", &["a", "b", "c"], "local"))
            .await;

        assert_eq!(
            reply,
            Reply::FileExists("Group [b] already exists on domain [LOCAL]".to_string())
        );
        assert!(!service.store().contains("LOCAL", "a"));
    }

    #[tokio::test]
    async fn audit_trail_records_outcomes() {
        let trail = Arc::new(AuditTrail::new());
        let service = service().with_audit_trail(Arc::clone(&trail));

        service
            .create_groups(&create_call("uid:0", &["a", "b"], "LOCAL"))
            .await;
        service
            .create_groups(&create_call("uid:0", &["a"], "LOCAL"))
            .await;
        service
            .create_groups(&create_call("uid:9", &["z"], "LOCAL"))
            .await;

        let outcomes: Vec<_> = trail.events().iter().map(|e| e.outcome()).collect();
        assert_eq!(
            outcomes,
            [AuditOutcome::Success, AuditOutcome::Conflict, AuditOutcome::Denied]
        );
        assert_eq!(trail.events()[0].affected(), 2);
    }

    #[tokio::test]
    async fn handle_sends_exactly_one_reply() {
        let service = service();
        let sink = ReplyLog::new();

        service
            .handle("CreateGroups", &create_call("uid:0", &["a"], "LOCAL"), &sink)
            .await;
        service
            .handle("Frobnicate", &MethodCall::new("req-unknown"), &sink)
            .await;

        assert_eq!(sink.replies_for("req-svc"), vec![Reply::Success]);
        assert!(matches!(
            sink.replies_for("req-unknown").as_slice(),
            [Reply::UnknownMethod(_)]
        ));
    }
}
