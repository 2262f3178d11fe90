//! Synchronization helpers
//!
//! Poison recovery for the configuration lock and the single-operation
//! guard used by [`BackupManager`](crate::BackupManager).

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Extension trait for RwLock with poison recovery
pub(crate) trait RwLockExt<T> {
    /// Acquire a read lock, recovering from poison errors
    fn read_recovered(&self) -> RwLockReadGuard<'_, T>;

    /// Acquire a write lock, recovering from poison errors
    fn write_recovered(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (read), recovering");
            poisoned.into_inner()
        })
    }

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (write), recovering");
            poisoned.into_inner()
        })
    }
}

/// Flag allowing at most one backup/restore at a time
#[derive(Debug, Default)]
pub(crate) struct OperationLock {
    busy: AtomicBool,
}

impl OperationLock {
    /// Claim the lock, failing with [`Error::Busy`] if it is already held
    pub(crate) fn try_acquire(&self) -> Result<OperationGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(OperationGuard { lock: self })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`OperationLock`] when dropped
pub(crate) struct OperationGuard<'a> {
    lock: &'a OperationLock,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.lock.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_busy() {
        let lock = OperationLock::default();
        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_busy());
        assert!(matches!(lock.try_acquire(), Err(Error::Busy)));

        drop(guard);
        assert!(!lock.is_busy());
        assert!(lock.try_acquire().is_ok());
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let lock = std::sync::Arc::new(RwLock::new(1));
        let clone = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.write().unwrap();
            panic!("poison");
        })
        .join();

        assert!(lock.is_poisoned());
        *lock.write_recovered() = 2;
        assert_eq!(*lock.read_recovered(), 2);
    }
}
