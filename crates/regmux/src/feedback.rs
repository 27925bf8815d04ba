//! Exit requests from the register layer to the execution engine.
//!
//! Translated code assumes the program counter only moves the way the guest
//! moves it. When the host writes the PC, the engine has to leave the current
//! translation block and look up the new address. The engine holds a clone
//! of the CPU's [`ExitLatch`] and polls it at instruction boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::trace;

#[derive(Debug, Default)]
struct Shared {
    pending: AtomicBool,
    raised: AtomicU64,
}

/// Cloneable handle; every clone observes the same latch.
#[derive(Debug, Clone, Default)]
pub struct ExitLatch {
    shared: Arc<Shared>,
}

impl ExitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the engine to stop and re-dispatch.
    pub(crate) fn raise(&self) {
        self.shared.raised.fetch_add(1, Ordering::Relaxed);
        if !self.shared.pending.swap(true, Ordering::Release) {
            trace!("exit requested");
        }
    }

    /// Consume a pending request. Returns `true` at most once per request.
    pub fn take(&self) -> bool {
        self.shared.pending.swap(false, Ordering::Acquire)
    }

    pub fn is_pending(&self) -> bool {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Total number of requests raised over the latch's life.
    pub fn raised_count(&self) -> u64 {
        self.shared.raised.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_request() {
        let latch = ExitLatch::new();
        let engine = latch.clone();
        assert!(!engine.take());

        latch.raise();
        latch.raise();
        assert!(engine.is_pending());
        assert!(engine.take());
        assert!(!engine.take());
        assert_eq!(engine.raised_count(), 2);
    }

    #[test]
    fn visible_across_threads() {
        let latch = ExitLatch::new();
        let engine = latch.clone();
        latch.raise();
        let seen = std::thread::spawn(move || engine.take()).join().unwrap();
        assert!(seen);
        assert!(!latch.is_pending());
    }
}
