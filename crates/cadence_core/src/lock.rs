//! Interaction locking
//!
//! While an animation runs with UI locking enabled, the host is expected to
//! ignore user interaction. The lock itself is a collaborator: the engine only
//! acquires it through an [`InteractionGuard`], which releases it exactly once
//! when dropped, whichever way playback ends.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Exclusive interaction lock provided by the host
///
/// Acquisitions nest: a host that is locked twice stays locked until it has
/// been released twice.
pub trait InteractionLock: Send + Sync {
    fn acquire(&self);
    fn release(&self);
    fn is_locked(&self) -> bool;
}

/// Scoped acquisition of an [`InteractionLock`]
pub struct InteractionGuard {
    lock: Arc<dyn InteractionLock>,
}

impl InteractionGuard {
    pub fn acquire(lock: Arc<dyn InteractionLock>) -> Self {
        lock.acquire();
        tracing::debug!("interaction lock acquired");
        Self { lock }
    }
}

impl Drop for InteractionGuard {
    fn drop(&mut self) {
        self.lock.release();
        tracing::debug!("interaction lock released");
    }
}

impl fmt::Debug for InteractionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionGuard")
            .field("locked", &self.lock.is_locked())
            .finish()
    }
}

/// Counting interaction lock
///
/// Mirrors the begin/end-ignoring-interaction pair of native toolkits. Keeps
/// running totals so callers can check that every acquisition was balanced.
#[derive(Debug, Default)]
pub struct InteractionCounter {
    depth: AtomicUsize,
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
}

impl InteractionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    /// Total number of acquisitions so far
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Acquire)
    }

    /// Total number of releases so far
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Acquire)
    }
}

impl InteractionLock for InteractionCounter {
    fn acquire(&self) {
        self.depth.fetch_add(1, Ordering::AcqRel);
        self.acquisitions.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        let released = self
            .depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| {
                depth.checked_sub(1)
            });

        match released {
            Ok(_) => {
                self.releases.fetch_add(1, Ordering::AcqRel);
            }
            Err(_) => tracing::warn!("interaction lock released while not held"),
        }
    }

    fn is_locked(&self) -> bool {
        self.depth() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let counter = Arc::new(InteractionCounter::new());

        {
            let _guard = InteractionGuard::acquire(counter.clone());
            assert!(counter.is_locked());
            assert_eq!(counter.depth(), 1);
        }

        assert!(!counter.is_locked());
        assert_eq!(counter.acquisitions(), 1);
        assert_eq!(counter.releases(), 1);
    }

    #[test]
    fn test_nested_guards() {
        let counter = Arc::new(InteractionCounter::new());

        let outer = InteractionGuard::acquire(counter.clone());
        let inner = InteractionGuard::acquire(counter.clone());
        assert_eq!(counter.depth(), 2);

        drop(inner);
        assert!(counter.is_locked());

        drop(outer);
        assert!(!counter.is_locked());
    }

    #[test]
    fn test_unbalanced_release_does_not_underflow() {
        let counter = InteractionCounter::new();
        counter.release();

        assert_eq!(counter.depth(), 0);
        assert_eq!(counter.releases(), 0);
    }
}
