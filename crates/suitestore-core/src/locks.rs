use crate::CoreError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use suitestore_schema::SuiteId;

/// How a suite is held by whoever locked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteLock {
    /// The suite is in use (e.g. running); it must not be replaced or removed.
    Read,
    /// The suite is being updated by the holder; installing over it is allowed.
    Update,
}

/// In-process registry of locked suites.
///
/// Callers lock a suite before running or updating it; the installer only
/// consults the registry.
#[derive(Debug, Default)]
pub struct SuiteLockRegistry {
    locks: Mutex<HashMap<SuiteId, SuiteLock>>,
}

impl SuiteLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<SuiteId, SuiteLock>> {
        // A panic while holding the map cannot leave it half-updated.
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn find_lock(&self, suite_id: SuiteId) -> Option<SuiteLock> {
        self.guard().get(&suite_id).copied()
    }

    pub fn lock(&self, suite_id: SuiteId, kind: SuiteLock) -> Result<(), CoreError> {
        let mut locks = self.guard();
        if locks.contains_key(&suite_id) {
            return Err(CoreError::SuiteLocked(suite_id));
        }
        locks.insert(suite_id, kind);
        Ok(())
    }

    /// Returns the lock that was released, if any.
    pub fn unlock(&self, suite_id: SuiteId) -> Option<SuiteLock> {
        self.guard().remove(&suite_id)
    }
}
