//! GroupStore trait definition and store errors.

use std::fmt;

use async_trait::async_trait;

use crate::domain::Domain;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`GroupStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A group with this name already exists in the domain.
    AlreadyExists {
        /// Conflicting group name
        name: String,
        /// Domain the name collided in
        domain: String,
    },
    /// No transaction could be opened.
    TransactionUnavailable {
        /// Backend explanation
        message: String,
    },
    /// The domain has no free ids left.
    IdRangeExhausted {
        /// Exhausted domain
        domain: String,
    },
    /// Any other backend failure.
    Backend {
        /// Backend explanation
        message: String,
    },
}

impl StoreError {
    /// Returns true for the duplicate-name failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::AlreadyExists { name, domain } => {
                write!(f, "group {} already exists in {}", name, domain)
            }
            StoreError::TransactionUnavailable { message } => {
                write!(f, "transaction unavailable: {}", message)
            }
            StoreError::IdRangeExhausted { domain } => {
                write!(f, "no free ids left in {}", domain)
            }
            StoreError::Backend { message } => write!(f, "backend error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

/// How a transaction is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Publish every staged change.
    Commit,
    /// Discard every staged change; carries the failure that caused it.
    Abort(StoreError),
}

/// Transactional identity store.
///
/// A transaction handle is produced by [`begin`](Self::begin), borrowed by
/// every [`add_group`](Self::add_group) of one batch, and consumed by
/// [`finish`](Self::finish), so it is finished exactly once and cannot be
/// shared between requests.
///
/// Implementations must be thread-safe (Send + Sync) and support async
/// operations. Changes made inside a transaction are invisible to readers
/// until it commits, and an aborted transaction leaves no trace.
#[async_trait]
pub trait GroupStore: Send + Sync + 'static {
    /// Opaque transaction handle.
    type Transaction: Send;

    /// Opens a new transaction.
    async fn begin(&self) -> StoreResult<Self::Transaction>;

    /// Creates one group inside `tx`, allocating its id from the domain range.
    ///
    /// Completes with `AlreadyExists` when the name is taken, either by a
    /// committed group or by an earlier creation in the same transaction.
    async fn add_group(
        &self,
        tx: &mut Self::Transaction,
        domain: &Domain,
        name: &str,
    ) -> StoreResult<u32>;

    /// Finishes `tx`.
    ///
    /// A failing commit must leave nothing from the transaction visible.
    async fn finish(&self, tx: Self::Transaction, status: TxStatus) -> StoreResult<()>;
}
