//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use identity_groups::{
    Arg, Domain, DomainMap, GroupsConfig, GroupsService, MemoryStore, MethodCall,
    PermissionTable, Principal,
};

pub const ADMIN: &str = "uid:0";
pub const USER: &str = "uid:1000";

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn config() -> GroupsConfig {
    GroupsConfig {
        admins: vec![ADMIN.to_string()],
        ..GroupsConfig::default()
    }
}

pub fn domains() -> DomainMap {
    DomainMap::new()
        .with(Domain::new("LOCAL", 1000, 60000))
        .with(Domain::new("REMOTE", 200000, 300000))
}

pub fn service_with(store: Arc<MemoryStore>) -> GroupsService<MemoryStore> {
    let config = config();
    let permissions = PermissionTable::from_config(&config);
    GroupsService::new(config, domains(), permissions, store)
}

pub fn service() -> GroupsService<MemoryStore> {
    service_with(Arc::new(MemoryStore::new()))
}

pub fn create_call(request_id: &str, caller: &str, names: &[&str], domain: &str) -> MethodCall {
    MethodCall::new(request_id)
        .with_caller(Principal::named(caller))
        .with_arg(Arg::StrArray(names.iter().map(|n| n.to_string()).collect()))
        .with_arg(Arg::Str(domain.to_string()))
}
