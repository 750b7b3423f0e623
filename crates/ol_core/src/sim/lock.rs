//! Run lock for the day-advancement loop.
//!
//! Two independent flags: "a simulation run is active" (exclusive; only one
//! controller chain may hold it, continuation iterations never re-acquire)
//! and "a cooperative stop was requested" (checked once per day boundary, so
//! a stop takes effect only after the current day fully resolves). The lock
//! is an explicit session object owned by the embedder, not ambient process
//! state, so concurrent test scenarios stay deterministic.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct RunLock {
    game_sim: AtomicBool,
    stop_requested: AtomicBool,
}

impl RunLock {
    /// Both flags start cleared, matching application start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to mark a run active. Fails when another run holds the lock.
    pub fn try_acquire(&self) -> bool {
        self.game_sim
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn release(&self) {
        self.game_sim.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.game_sim.load(Ordering::SeqCst)
    }

    /// Ask the run to halt after the current day. Does not release the run
    /// lock; the controller does that when it actually stops.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn clear_stop(&self) {
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}
