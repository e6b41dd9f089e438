//! Transactional group provisioning for an identity-management service.
//!
//! This crate implements the groups interface of an identity bus service:
//! - **CreateGroups**: creates a batch of groups in one all-or-nothing
//!   transaction, after domain resolution and a permission check
//! - **DeleteGroups / AddMembers / RemoveMembers / SetGid**: reply
//!   "not supported"
//!
//! # Core Types
//!
//! - [`GroupsService`]: Method routing with injected collaborators
//! - [`AdmissionGate`]: Domain and permission checks, the only way to obtain
//!   an admitted [`BatchCreateRequest`]
//! - [`BatchDriver`]: Sequential creation inside one transaction
//! - [`GroupStore`]: Transactional store boundary, [`MemoryStore`] in memory
//! - [`DomainRegistry`] / [`PermissionGate`]: Lookup and decision boundaries
//! - [`Reply`]: Protocol reply for one call
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use identity_groups::{
//!     Arg, Domain, DomainMap, GroupsConfig, GroupsService, MemoryStore, MethodCall,
//!     PermissionTable, Principal, Reply,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let config = GroupsConfig { admins: vec!["uid:0".to_string()], ..GroupsConfig::default() };
//! let service = GroupsService::new(
//!     config.clone(),
//!     DomainMap::new().with(Domain::new("LOCAL", 1000, 60000)),
//!     PermissionTable::from_config(&config),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let call = MethodCall::new("req-1")
//!     .with_caller(Principal::named("uid:0"))
//!     .with_arg(Arg::StrArray(vec!["wheel".to_string()]))
//!     .with_arg(Arg::Str("REMOTE".to_string()));
//!
//! // Only configured domains accept creation
//! assert_eq!(
//!     service.create_groups(&call).await,
//!     Reply::InvalidArgs("Invalid domain.".to_string()),
//! );
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod batch;
pub mod call;
mod config;
mod context;
mod domain;
mod error;
mod gate;
mod logging;
mod memory;
mod policy;
mod reply;
mod request;
mod service;
mod state;
mod store;

pub use batch::{BatchCursor, BatchDriver, BatchSummary, CreatedGroup, Step};
pub use call::{Arg, ArgError, CreateGroupsArgs, MethodCall};
pub use config::GroupsConfig;
pub use context::BatchCreateRequest;
pub use domain::{Domain, DomainMap, DomainRegistry};
pub use error::{Error, Violation, ViolationKind};
pub use gate::AdmissionGate;
pub use logging::RequestLog;
pub use memory::{MemoryStore, MemoryTransaction, StoreOp};
pub use policy::{Action, ObjectType, PermissionGate, PermissionTable};
pub use reply::{Reply, ReplyLog, ReplySink};
pub use request::{Principal, RequestMeta};
pub use service::{GroupsService, Method};
pub use state::{Admitted, Unchecked};
pub use store::{GroupStore, StoreError, StoreResult, TxStatus};
