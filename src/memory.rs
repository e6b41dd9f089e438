//! In-memory transactional group store.
//!
//! Committed groups live in a per-domain map. A [`MemoryTransaction`] stages
//! creations privately until it is committed, at which point the staged set is
//! re-validated and published in one step. Gids handed out to open
//! transactions stay reserved until they finish or are dropped, so concurrent
//! batches never receive the same gid. Every call is appended to a journal so
//! tests can assert on exactly which operations reached the store.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::Domain;
use crate::store::{GroupStore, StoreError, StoreResult, TxStatus};

/// One operation observed by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A transaction was opened.
    Begin(u64),
    /// A creation was attempted inside a transaction.
    Add {
        /// Transaction id
        tx: u64,
        /// Domain name
        domain: String,
        /// Group name
        name: String,
    },
    /// A transaction was committed successfully.
    Commit(u64),
    /// A transaction was aborted, its commit failed, or it was dropped
    /// without being finished.
    Abort(u64),
}

/// Handle for a transaction opened on a [`MemoryStore`].
///
/// Dropping the handle without finishing it rolls the transaction back and
/// releases the gids it reserved.
pub struct MemoryTransaction {
    id: u64,
    staged: Vec<StagedGroup>,
    finished: bool,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTransaction {
    /// Returns the transaction id as recorded in the journal.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of groups staged so far.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

impl fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("id", &self.id)
            .field("staged", &self.staged)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut inner = lock(&self.inner);
        inner.release(&self.staged);
        inner.journal.push(StoreOp::Abort(self.id));
        tracing::debug!(tx = self.id, "transaction dropped unfinished, rolled back");
    }
}

#[derive(Debug, Clone)]
struct StagedGroup {
    domain: String,
    name: String,
    gid: u32,
}

#[derive(Debug, Default)]
struct Inner {
    // domain -> group name -> gid
    groups: BTreeMap<String, BTreeMap<String, u32>>,
    // domain -> gids staged by open transactions
    reserved: BTreeMap<String, BTreeSet<u32>>,
    // kept for the lifetime of the store
    journal: Vec<StoreOp>,
    next_tx: u64,
    fail_begin: bool,
    fail_commit: bool,
    fail_on: HashSet<String>,
}

impl Inner {
    fn committed(&self, domain: &str, name: &str) -> bool {
        self.groups
            .get(domain)
            .is_some_and(|groups| groups.contains_key(name))
    }

    fn used_ids(&self, domain: &str) -> BTreeSet<u32> {
        let mut used: BTreeSet<u32> = self
            .groups
            .get(domain)
            .map(|groups| groups.values().copied().collect())
            .unwrap_or_default();
        if let Some(reserved) = self.reserved.get(domain) {
            used.extend(reserved);
        }
        used
    }

    fn release(&mut self, staged: &[StagedGroup]) {
        for group in staged {
            if let Some(reserved) = self.reserved.get_mut(&group.domain) {
                reserved.remove(&group.gid);
            }
        }
    }
}

/// Transactional in-memory [`GroupStore`].
///
/// Intended for tests and local fixtures. The operation journal is never
/// truncated, so memory use grows with every call made against the store.
///
/// # Examples
///
/// ```
/// use identity_groups::{Domain, GroupStore, MemoryStore, TxStatus};
///
/// # tokio_test_block_on(async {
/// let store = MemoryStore::new();
/// let local = Domain::new("LOCAL", 1000, 60000);
///
/// let mut tx = store.begin().await.unwrap();
/// let gid = store.add_group(&mut tx, &local, "wheel").await.unwrap();
/// assert!(!store.contains("LOCAL", "wheel"));
///
/// store.finish(tx, TxStatus::Commit).await.unwrap();
/// assert_eq!(store.gid_of("LOCAL", "wheel"), Some(gid));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Inserts an already-committed group, bypassing transactions.
    pub fn seed(&self, domain: &str, name: &str, gid: u32) {
        self.lock()
            .groups
            .entry(domain.to_string())
            .or_default()
            .insert(name.to_string(), gid);
    }

    /// Makes every subsequent `begin` fail.
    pub fn fail_begin(&self, fail: bool) {
        self.lock().fail_begin = fail;
    }

    /// Makes every subsequent commit fail.
    pub fn fail_commit(&self, fail: bool) {
        self.lock().fail_commit = fail;
    }

    /// Makes creation of `name` fail with a backend error.
    pub fn fail_on(&self, name: &str) {
        self.lock().fail_on.insert(name.to_string());
    }

    /// Returns true if `name` is committed in `domain`.
    pub fn contains(&self, domain: &str, name: &str) -> bool {
        self.lock().committed(domain, name)
    }

    /// Returns the gid of a committed group.
    pub fn gid_of(&self, domain: &str, name: &str) -> Option<u32> {
        self.lock()
            .groups
            .get(domain)
            .and_then(|groups| groups.get(name).copied())
    }

    /// Returns the committed group names in `domain`, sorted.
    pub fn group_names(&self, domain: &str) -> Vec<String> {
        self.lock()
            .groups
            .get(domain)
            .map(|groups| groups.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns a snapshot of the operation journal.
    pub fn journal(&self) -> Vec<StoreOp> {
        self.lock().journal.clone()
    }

    /// Returns the group names passed to `add_group`, in call order.
    pub fn attempted_names(&self) -> Vec<String> {
        self.lock()
            .journal
            .iter()
            .filter_map(|op| match op {
                StoreOp::Add { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn first_free_id(used: &BTreeSet<u32>, domain: &Domain) -> Option<u32> {
    let mut candidate = domain.min_id();
    for &id in used.range(domain.min_id()..) {
        if id > candidate {
            break;
        }
        candidate = id.checked_add(1)?;
    }
    (candidate <= domain.max_id()).then_some(candidate)
}

#[async_trait]
impl GroupStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> StoreResult<MemoryTransaction> {
        let mut inner = self.lock();
        if inner.fail_begin {
            return Err(StoreError::TransactionUnavailable {
                message: "transaction slots exhausted".to_string(),
            });
        }
        inner.next_tx += 1;
        let id = inner.next_tx;
        inner.journal.push(StoreOp::Begin(id));
        Ok(MemoryTransaction {
            id,
            staged: Vec::new(),
            finished: false,
            inner: Arc::clone(&self.inner),
        })
    }

    async fn add_group(
        &self,
        tx: &mut MemoryTransaction,
        domain: &Domain,
        name: &str,
    ) -> StoreResult<u32> {
        let mut inner = self.lock();
        inner.journal.push(StoreOp::Add {
            tx: tx.id,
            domain: domain.name().to_string(),
            name: name.to_string(),
        });

        if inner.fail_on.contains(name) {
            return Err(StoreError::Backend {
                message: format!("injected failure for {}", name),
            });
        }

        let staged_here = tx
            .staged
            .iter()
            .any(|g| g.domain == domain.name() && g.name == name);
        if staged_here || inner.committed(domain.name(), name) {
            return Err(StoreError::AlreadyExists {
                name: name.to_string(),
                domain: domain.name().to_string(),
            });
        }

        let used = inner.used_ids(domain.name());
        let gid = first_free_id(&used, domain).ok_or_else(|| StoreError::IdRangeExhausted {
            domain: domain.name().to_string(),
        })?;
        inner
            .reserved
            .entry(domain.name().to_string())
            .or_default()
            .insert(gid);

        tx.staged.push(StagedGroup {
            domain: domain.name().to_string(),
            name: name.to_string(),
            gid,
        });
        Ok(gid)
    }

    async fn finish(&self, mut tx: MemoryTransaction, status: TxStatus) -> StoreResult<()> {
        tx.finished = true;
        let staged = mem::take(&mut tx.staged);
        let mut inner = self.lock();
        inner.release(&staged);

        if let TxStatus::Abort(reason) = status {
            tracing::debug!(tx = tx.id, %reason, "aborting transaction");
            inner.journal.push(StoreOp::Abort(tx.id));
            return Ok(());
        }

        if inner.fail_commit {
            inner.journal.push(StoreOp::Abort(tx.id));
            return Err(StoreError::Backend {
                message: "commit failed".to_string(),
            });
        }

        // Another transaction or a seed may have taken the same name or gid
        // since this one staged it.
        for group in &staged {
            let committed = inner.groups.get(&group.domain);
            if committed.is_some_and(|groups| groups.contains_key(&group.name)) {
                inner.journal.push(StoreOp::Abort(tx.id));
                return Err(StoreError::AlreadyExists {
                    name: group.name.clone(),
                    domain: group.domain.clone(),
                });
            }
            if committed.is_some_and(|groups| groups.values().any(|&g| g == group.gid)) {
                inner.journal.push(StoreOp::Abort(tx.id));
                return Err(StoreError::Backend {
                    message: format!(
                        "gid {} is already in use in {}",
                        group.gid, group.domain
                    ),
                });
            }
        }

        for staged in staged {
            inner
                .groups
                .entry(staged.domain)
                .or_default()
                .insert(staged.name, staged.gid);
        }
        inner.journal.push(StoreOp::Commit(tx.id));
        Ok(())
    }
}
