//! Single-entry reentrancy lock

use std::cell::Cell;

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: Cell<bool>,
}

impl ReentrancyLock {
    /// Enter the lock; released when the returned guard drops
    pub fn acquire(&self) -> EngineResult<LockGuard<'_>> {
        if self.entered.replace(true) {
            return Err(EngineError::ReentrantCall);
        }
        Ok(LockGuard { lock: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.get()
    }
}

#[must_use]
pub struct LockGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.set(false);
    }
}
