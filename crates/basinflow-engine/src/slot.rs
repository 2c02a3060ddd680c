//! Mutual exclusion on the active-run slot of a scenario.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::RunError;

/// At most one run may be active per slot.
///
/// The host keeps one `RunSlot` per scenario and passes it to every run
/// of that scenario. A second [`try_begin`](Self::try_begin) while a
/// [`RunGuard`] is alive is rejected with [`RunError::Busy`].
#[derive(Clone, Debug, Default)]
pub struct RunSlot {
    active: Arc<AtomicBool>,
}

impl RunSlot {
    /// A free slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for one run.
    pub fn try_begin(&self) -> Result<RunGuard, RunError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RunError::Busy)?;
        Ok(RunGuard {
            active: Arc::clone(&self.active),
        })
    }

    /// Whether a run currently holds the slot.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Holds a [`RunSlot`] until dropped.
#[derive(Debug)]
pub struct RunGuard {
    active: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
