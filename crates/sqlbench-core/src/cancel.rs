//! Cancellation handle for run sequences

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle for cancelling a running benchmark sequence from any thread.
///
/// Safe to call from any thread and idempotent; subsequent calls are
/// no-ops. The runner checks the handle between runs, so cancellation
/// never interrupts a statement mid-flight.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a fresh, un-cancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_sticky_and_shared() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_cancelled());

        clone.cancel();
        clone.cancel();
        assert!(handle.is_cancelled());
    }
}
