//! Per-component lock registry.
//!
//! Issue, return, restock and delete on the same component must be mutually
//! exclusive end-to-end (read stock, mutate stock, write ledger as one unit).
//! Operations on different components must never block each other, so each
//! component gets its own mutex rather than one engine-wide lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use labstock_core::{ComponentId, DomainError, DomainResult};

/// Registry of one mutex per component.
///
/// Lock handles are `Arc`s, so a `retire` racing with a holder is safe: the
/// holder keeps its guard alive, and any later acquirer re-checks component
/// existence under the fresh lock and fails `NotFound`.
#[derive(Debug, Default)]
pub struct ComponentLocks {
    inner: RwLock<HashMap<ComponentId, Arc<Mutex<()>>>>,
}

impl ComponentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or lazily create) the lock handle for a component.
    pub fn handle(&self, id: ComponentId) -> DomainResult<Arc<Mutex<()>>> {
        {
            let locks = self
                .inner
                .read()
                .map_err(|_| DomainError::conflict("lock registry poisoned"))?;
            if let Some(lock) = locks.get(&id) {
                return Ok(Arc::clone(lock));
            }
        }

        let mut locks = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("lock registry poisoned"))?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    /// Drop the registry entry for a deleted component.
    pub fn retire(&self, id: ComponentId) -> DomainResult<()> {
        let mut locks = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("lock registry poisoned"))?;
        locks.remove(&id);
        Ok(())
    }
}

/// Acquire a guard on a lock handle, mapping poisoning to a retryable conflict.
pub fn acquire(lock: &Arc<Mutex<()>>) -> DomainResult<MutexGuard<'_, ()>> {
    lock.lock()
        .map_err(|_| DomainError::conflict("component lock poisoned"))
}
