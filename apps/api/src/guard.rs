//! Single in-flight operation guard.
//!
//! `try_acquire` sets the flag on entry; the returned token clears it when dropped,
//! so every exit path (success, error, timeout, panic unwind) releases the guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while another operation holds the guard.
    pub fn try_acquire(&self) -> Option<InFlightToken> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightToken {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct InFlightToken {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
