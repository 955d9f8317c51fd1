//! Shared "operation in flight" flag

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Observable busy flag for a single in-flight async operation
///
/// Engines own one of these per async operation (search, bulk action,
/// export). Clones share state, so UI code can hold a handle and poll it
/// while the engine is borrowed by the running operation.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the operation is currently running
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Mark the operation as started; it ends when the guard drops
    pub(crate) fn begin(&self) -> InFlightGuard {
        self.0.store(true, Ordering::SeqCst);
        InFlightGuard(self.0.clone())
    }
}

pub(crate) struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_resets_flag() {
        let flag = InFlight::new();
        let observer = flag.clone();
        {
            let _guard = flag.begin();
            assert!(observer.get());
        }
        assert!(!observer.get());
    }
}
