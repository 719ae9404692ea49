//! Per-process monotonic nanosecond clock.
//!
//! Every timestamp a process emits (send, receive, arrival) is taken from one
//! anchor so they share an origin and survive wall-clock jumps. Clocks are
//! NOT comparable across processes; analysis tooling must not assume a common
//! epoch.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Nanoseconds since this clock was created.
    pub fn now_ns(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
