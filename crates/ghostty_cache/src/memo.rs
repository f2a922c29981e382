//! Compute-once slots and the readiness guard in front of them.

use ghostty_error::{ResourceError, ResourceErrorKind, ResourceResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

enum Slot<T> {
    Unresolved,
    Resolved(Arc<T>),
}

/// A value computed on first successful access and kept forever after.
///
/// Failed computations are not stored; the next access tries again. The
/// resolver runs under the slot's lock, so it must not block on anything
/// that could re-enter the same slot.
pub struct Memo<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Memo<T> {
    /// Create an unresolved slot.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Unresolved),
        }
    }

    /// Whether a value has been computed.
    pub fn is_resolved(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Resolved(_))
    }

    /// Return the cached value, computing it with `resolve` if needed.
    pub fn get_or_try_init<E>(&self, resolve: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock();
        if let Slot::Resolved(value) = &*slot {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(resolve()?);
        *slot = Slot::Resolved(Arc::clone(&value));
        Ok(value)
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Latch set once the gateway has delivered its ready event.
#[derive(Debug, Default)]
pub struct ReadySignal(AtomicBool);

impl ReadySignal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the gateway is ready. Idempotent.
    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the gateway has been ready at least once.
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fail with `NotReady` unless the gateway is ready.
    #[track_caller]
    pub fn ensure(&self, resource: &'static str) -> ResourceResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(ResourceError::new(ResourceErrorKind::NotReady(resource)))
        }
    }
}
