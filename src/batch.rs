//! Sequential batch creation inside one transaction.
//!
//! [`BatchCursor`] is the state machine: it decides the next [`Step`] from the
//! outcome of the previous creation. [`BatchDriver`] runs it against a
//! [`GroupStore`], awaiting each creation before issuing the next, so at most
//! one creation per request is ever in flight and groups are created in input
//! order.
//!
//! ```text
//! begin ──> Create(0) ──ok──> Create(1) ──ok──> ... ──ok──> Commit
//!              │                  │
//!              └──────err─────────┴──────────────────────> Abort(reason)
//! ```

use crate::context::BatchCreateRequest;
use crate::error::Error;
use crate::logging::RequestLog;
use crate::state::Admitted;
use crate::store::{GroupStore, StoreError, StoreResult, TxStatus};

/// What the driver must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Create the group at this index.
    Create(usize),
    /// Every group was created; commit the transaction.
    Commit,
    /// A creation failed; abort the transaction with this reason.
    Abort(StoreError),
}

/// Progress through one batch.
///
/// The cursor is the index of the group currently being created. It starts
/// at 0, advances by exactly one per successful creation and never exceeds
/// the batch length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCursor {
    len: usize,
    cursor: usize,
}

impl BatchCursor {
    /// Creates a cursor over a batch of `len` groups.
    pub fn new(len: usize) -> Self {
        Self { len, cursor: 0 }
    }

    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the first step once the transaction is open.
    ///
    /// An empty batch commits immediately.
    pub fn start(&self) -> Step {
        if self.len == 0 {
            Step::Commit
        } else {
            Step::Create(0)
        }
    }

    /// Advances on the completion of `Create(position())`.
    ///
    /// Once the cursor has reached the end, further completions keep
    /// returning [`Step::Commit`] without moving it.
    pub fn complete<T>(&mut self, result: StoreResult<T>) -> Step {
        match result {
            Ok(_) if self.cursor >= self.len => Step::Commit,
            Ok(_) => {
                self.cursor += 1;
                if self.cursor < self.len {
                    Step::Create(self.cursor)
                } else {
                    Step::Commit
                }
            }
            Err(reason) => Step::Abort(reason),
        }
    }
}

/// A group committed by a successful batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGroup {
    /// Group name
    pub name: String,
    /// Allocated gid
    pub gid: u32,
}

/// Result of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Domain the groups were created in
    pub domain: String,
    /// Created groups in creation order
    pub created: Vec<CreatedGroup>,
}

/// Drives an admitted batch against a transactional store.
#[derive(Debug)]
pub struct BatchDriver<'a, S: GroupStore> {
    store: &'a S,
}

impl<'a, S: GroupStore> BatchDriver<'a, S> {
    /// Creates a driver over `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Creates every group of `request` or none of them.
    ///
    /// # Errors
    ///
    /// - `StoreError::TransactionUnavailable` (or any `begin` failure) when no
    ///   transaction could be opened; nothing was attempted.
    /// - `StoreError::AlreadyExists` naming the first conflicting group and the
    ///   requested domain; the transaction was aborted and later names were
    ///   never attempted.
    /// - Any other `StoreError` from creation or commit; nothing was committed.
    pub async fn run(
        &self,
        request: &BatchCreateRequest<Admitted>,
        log: &RequestLog<'_>,
    ) -> Result<BatchSummary, Error> {
        let domain = request.domain();
        let names = request.names();

        let mut tx = self.store.begin().await.map_err(|e| {
            log.error(format_args!("Could not open transaction: {}", e));
            Error::Store(e)
        })?;
        log.debug(format_args!(
            "Transaction open for {} groups on {}",
            names.len(),
            domain
        ));

        let mut cursor = BatchCursor::new(names.len());
        let mut created = Vec::with_capacity(names.len());
        let mut step = cursor.start();

        loop {
            match step {
                Step::Create(index) => {
                    let name = &names[index];
                    log.debug(format_args!("Creating group [{}] ({})", name, index));

                    let result = self
                        .store
                        .add_group(&mut tx, domain, name)
                        .await
                        .map_err(|e| {
                            if e.is_conflict() {
                                StoreError::AlreadyExists {
                                    name: name.clone(),
                                    domain: domain.name().to_string(),
                                }
                            } else {
                                e
                            }
                        });
                    if let Ok(gid) = result {
                        created.push(CreatedGroup {
                            name: name.clone(),
                            gid,
                        });
                    }
                    step = cursor.complete(result);
                }
                Step::Commit => {
                    if let Err(e) = self.store.finish(tx, TxStatus::Commit).await {
                        log.error(format_args!("Commit failed: {}", e));
                        return Err(Error::Store(e));
                    }
                    log.debug(format_args!("Committed {} groups", created.len()));
                    return Ok(BatchSummary {
                        domain: domain.name().to_string(),
                        created,
                    });
                }
                Step::Abort(reason) => {
                    if reason.is_conflict() {
                        log.warn(format_args!("Aborting batch: {}", reason));
                    } else {
                        log.error(format_args!("Aborting batch: {}", reason));
                    }
                    if let Err(e) = self
                        .store
                        .finish(tx, TxStatus::Abort(reason.clone()))
                        .await
                    {
                        log.error(format_args!("Abort failed: {}", e));
                    }
                    return Err(Error::Store(reason));
                }
            }
        }
    }
}
