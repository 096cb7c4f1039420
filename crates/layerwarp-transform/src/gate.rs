//! Per-document operation gate
//!
//! Runs against one document must not interleave: they share the document's
//! selection and active layers. The gate hands out one permit per document
//! and either rejects or queues later requests.

use layerwarp_core::DocumentId;
use layerwarp_settings::ReentrancyPolicy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::{Result, TransformError};

type LockMap = Mutex<HashMap<DocumentId, Arc<AsyncMutex<()>>>>;

/// Exclusive right to run against one document; released on drop
#[derive(Debug)]
pub struct OperationPermit {
    document: DocumentId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockMap>,
}

impl OperationPermit {
    /// Document the permit covers
    pub fn document(&self) -> DocumentId {
        self.document
    }
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        self.guard.take();
        // Nobody else holds or waits on the lock once only the map refers to it
        if locks
            .get(&self.document)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.document);
        }
        tracing::trace!("Released operation permit for {}", self.document);
    }
}

/// Serializes runs per document
#[derive(Debug, Default)]
pub struct OperationGate {
    policy: ReentrancyPolicy,
    locks: Arc<LockMap>,
}

impl OperationGate {
    /// Create a gate with the given policy
    pub fn new(policy: ReentrancyPolicy) -> Self {
        Self {
            policy,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Policy applied to contended documents
    pub fn policy(&self) -> ReentrancyPolicy {
        self.policy
    }

    fn lock_for(&self, document: DocumentId) -> Arc<AsyncMutex<()>> {
        Arc::clone(
            self.locks
                .lock()
                .entry(document)
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    /// Acquire the document, rejecting or waiting per policy
    pub async fn acquire(&self, document: DocumentId) -> Result<OperationPermit> {
        let lock = self.lock_for(document);
        let guard = match self.policy {
            ReentrancyPolicy::Reject => lock.try_lock_owned().map_err(|_| {
                tracing::warn!("Rejecting transform: {} is busy", document);
                TransformError::Busy { document }
            })?,
            ReentrancyPolicy::Queue => {
                if let Ok(guard) = Arc::clone(&lock).try_lock_owned() {
                    guard
                } else {
                    tracing::info!("Waiting for running transform on {}", document);
                    lock.lock_owned().await
                }
            }
        };
        tracing::trace!("Acquired operation permit for {}", document);
        Ok(OperationPermit {
            document,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        })
    }

    /// Whether a run currently holds the document
    pub fn is_busy(&self, document: DocumentId) -> bool {
        self.locks
            .lock()
            .get(&document)
            .is_some_and(|lock| lock.try_lock().is_err())
    }
}
