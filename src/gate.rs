use crate::{
    config::GroupsConfig,
    context::BatchCreateRequest,
    domain::DomainRegistry,
    error::{Violation, ViolationKind},
    policy::{Action, ObjectType, PermissionGate},
    state::{Admitted, Unchecked},
};

/// The admission gate for group creation.
///
/// `AdmissionGate` is the only way to obtain a `BatchCreateRequest<Admitted>`.
/// Checks run in a fixed order and the first failure wins:
///
/// 1. the requested domain must match a create-enabled domain from
///    [`GroupsConfig`] (ASCII case-insensitive);
/// 2. the configured spelling must resolve in the [`DomainRegistry`];
/// 3. the caller must be identified and the [`PermissionGate`] must allow
///    `(group, create)` in that domain;
/// 4. the batch must not exceed `max_batch_size`.
///
/// None of these touch the identity store.
///
/// # Examples
///
/// ```
/// use identity_groups::{
///     AdmissionGate, BatchCreateRequest, CreateGroupsArgs, Domain, DomainMap, GroupsConfig,
///     ObjectType, Action, PermissionTable, Principal, RequestMeta,
/// };
///
/// let config = GroupsConfig::default();
/// let domains = DomainMap::new().with(Domain::new("LOCAL", 1000, 60000));
/// let permissions = PermissionTable::new().grant("uid:0", ObjectType::Group, Action::Create);
///
/// let request = BatchCreateRequest::new(
///     RequestMeta { request_id: "req-1".to_string(), principal: Some(Principal::named("uid:0")) },
///     CreateGroupsArgs { names: vec!["wheel".to_string()], domain: "local".to_string() },
/// );
///
/// let admitted = AdmissionGate::new(&config, &domains, &permissions)
///     .admit(request)
///     .expect("admitted");
/// assert_eq!(admitted.domain().name(), "LOCAL");
/// ```
pub struct AdmissionGate<'a> {
    config: &'a GroupsConfig,
    registry: &'a dyn DomainRegistry,
    permissions: &'a dyn PermissionGate,
}

impl<'a> AdmissionGate<'a> {
    /// Creates a gate over the given collaborators.
    pub fn new(
        config: &'a GroupsConfig,
        registry: &'a dyn DomainRegistry,
        permissions: &'a dyn PermissionGate,
    ) -> Self {
        Self {
            config,
            registry,
            permissions,
        }
    }

    /// Validates a request and moves it to `Admitted`.
    ///
    /// # Errors
    ///
    /// Returns the `Violation` for the first check that fails.
    pub fn admit(
        &self,
        request: BatchCreateRequest<Unchecked>,
    ) -> Result<BatchCreateRequest<Admitted>, Violation> {
        let configured = self
            .config
            .accepts_create_on(request.requested_domain())
            .ok_or_else(Violation::invalid_domain)?;

        let domain = self
            .registry
            .lookup(configured)
            .ok_or_else(Violation::invalid_domain)?;

        let requester = request.requester().cloned().ok_or_else(|| {
            Violation::new(
                ViolationKind::Unauthenticated,
                "Caller identity could not be resolved",
            )
        })?;

        if !self
            .permissions
            .check(&requester, &domain, ObjectType::Group, Action::Create)
        {
            return Err(Violation::new(
                ViolationKind::Denied {
                    object: ObjectType::Group,
                    action: Action::Create,
                },
                format!("{} may not create groups in {}", requester.id, domain),
            ));
        }

        if request.len() > self.config.max_batch_size {
            return Err(Violation::new(
                ViolationKind::InvalidArguments,
                format!(
                    "Cannot create {} groups in one call, the limit is {}",
                    request.len(),
                    self.config.max_batch_size
                ),
            ));
        }

        Ok(request.admit(requester, domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::CreateGroupsArgs;
    use crate::domain::{Domain, DomainMap};
    use crate::policy::PermissionTable;
    use crate::request::{Principal, RequestMeta};

    fn request(domain: &str, caller: Option<&str>, names: &[&str]) -> BatchCreateRequest<Unchecked> {
        BatchCreateRequest::new(
            RequestMeta {
                request_id: "req-gate".to_string(),
                principal: caller.map(Principal::named),
            },
            CreateGroupsArgs {
                names: names.iter().map(|n| n.to_string()).collect(),
                domain: domain.to_string(),
            },
        )
    }

    fn fixtures() -> (GroupsConfig, DomainMap, PermissionTable) {
        (
            GroupsConfig::default(),
            DomainMap::new().with(Domain::new("LOCAL", 1000, 60000)),
            PermissionTable::new().grant("uid:0", ObjectType::Group, Action::Create),
        )
    }

    #[test]
    fn admits_case_insensitive_local() {
        let (config, domains, perms) = fixtures();
        let gate = AdmissionGate::new(&config, &domains, &perms);

        for spelling in ["LOCAL", "local", "Local"] {
            let admitted = gate.admit(request(spelling, Some("uid:0"), &["a"])).unwrap();
            assert_eq!(admitted.domain().name(), "LOCAL");
        }
    }

    #[test]
    fn other_domain_is_invalid() {
        let (config, domains, perms) = fixtures();
        let gate = AdmissionGate::new(&config, &domains, &perms);

        let err = gate.admit(request("REMOTE", Some("uid:0"), &["a"])).unwrap_err();
        assert_eq!(err, Violation::invalid_domain());
    }

    #[test]
    fn configured_but_unregistered_domain_is_invalid() {
        let (_, domains, perms) = fixtures();
        let config = GroupsConfig {
            create_domains: vec!["LOCAL".to_string(), "LAB".to_string()],
            ..GroupsConfig::default()
        };
        let gate = AdmissionGate::new(&config, &domains, &perms);

        let err = gate.admit(request("lab", Some("uid:0"), &["a"])).unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidDomain);
    }

    #[test]
    fn domain_is_checked_before_caller() {
        let (config, domains, perms) = fixtures();
        let gate = AdmissionGate::new(&config, &domains, &perms);

        let err = gate.admit(request("REMOTE", None, &["a"])).unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidDomain);
    }

    #[test]
    fn unknown_caller_is_refused() {
        let (config, domains, perms) = fixtures();
        let gate = AdmissionGate::new(&config, &domains, &perms);

        let err = gate.admit(request("LOCAL", None, &["a"])).unwrap_err();
        assert_eq!(err.kind, ViolationKind::Unauthenticated);
        assert!(err.kind.is_access_denied());
    }

    #[test]
    fn ungranted_caller_is_denied() {
        let (config, domains, perms) = fixtures();
        let gate = AdmissionGate::new(&config, &domains, &perms);

        let err = gate.admit(request("LOCAL", Some("uid:1000"), &["a"])).unwrap_err();
        assert!(matches!(
            err.kind,
            ViolationKind::Denied {
                object: ObjectType::Group,
                action: Action::Create
            }
        ));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let (_, domains, perms) = fixtures();
        let config = GroupsConfig {
            max_batch_size: 2,
            ..GroupsConfig::default()
        };
        let gate = AdmissionGate::new(&config, &domains, &perms);

        let err = gate
            .admit(request("LOCAL", Some("uid:0"), &["a", "b", "c"]))
            .unwrap_err();
        assert_eq!(err.kind, ViolationKind::InvalidArguments);
        assert!(gate.admit(request("LOCAL", Some("uid:0"), &["a", "b"])).is_ok());
    }
}
