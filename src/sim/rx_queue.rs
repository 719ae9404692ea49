//! rx_queue.rs
//! Decoupled telemetry receive path for the Simulator.
//!
//! A background thread owns the read half of the socket and loops on
//! `decode_one`: each telemetry frame is stamped with a monotonic arrival
//! time and pushed into a bounded lock-free queue. On overflow the OLDEST
//! entry is evicted; the bound keeps memory flat when the main loop stalls.
//!
//! The queue is the single synchronization point between the two Simulator
//! threads: one producer (reader), one consumer (step loop), non-blocking on
//! both sides. Reader termination (EOF, corrupt frame) flips a shared flag
//! the step loop can observe; it keeps running and records timeouts.

use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_queue::ArrayQueue;
use log::{debug, info};

use crate::protocol::framing;
use crate::protocol::message::{Envelope, TelemetryMessage};
use crate::utils::clock::MonotonicClock;

/// Bounded queue capacity. Plenty for a reply-per-step workload; small
/// enough that a stalled consumer cannot hoard memory.
pub const RX_QUEUE_CAPACITY: usize = 1024;

/// One decoded telemetry frame plus its Simulator-side arrival stamp.
#[derive(Debug, Clone)]
pub struct Arrival {
    pub arrival_ns: u64,
    pub telemetry: TelemetryMessage,
}

pub struct RxQueue {
    queue: Arc<ArrayQueue<Arrival>>,
    closed: Arc<AtomicBool>,
    evicted: Arc<AtomicU64>,
    _reader: JoinHandle<()>,
}

impl RxQueue {
    /// Spawns the reader thread over `reader`, which it owns until EOF or a
    /// decode failure. `clock` must be the same clock the step loop stamps
    /// its send times with.
    pub fn spawn<R: Read + Send + 'static>(reader: R, clock: MonotonicClock) -> Self {
        Self::with_capacity(reader, clock, RX_QUEUE_CAPACITY)
    }

    pub fn with_capacity<R: Read + Send + 'static>(
        mut reader: R,
        clock: MonotonicClock,
        capacity: usize,
    ) -> Self {
        let queue = Arc::new(ArrayQueue::new(capacity));
        let closed = Arc::new(AtomicBool::new(false));
        let evicted = Arc::new(AtomicU64::new(0));

        let q = queue.clone();
        let closed_flag = closed.clone();
        let evicted_count = evicted.clone();

        let handle = thread::spawn(move || {
            loop {
                match framing::decode_one(&mut reader) {
                    Ok(Envelope::Telemetry(telemetry)) => {
                        let arrival = Arrival {
                            arrival_ns: clock.now_ns(),
                            telemetry,
                        };
                        // force_push displaces the head (oldest) when full.
                        if q.force_push(arrival).is_some() {
                            evicted_count.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    Ok(Envelope::Command(cmd)) => {
                        debug!(
                            "[sim] ignoring command frame for step {} on the telemetry stream",
                            cmd.step_id
                        );
                    }
                    Err(e) => {
                        info!("[sim] rx closed: {e}");
                        break;
                    }
                }
            }
            closed_flag.store(true, Ordering::Release);
        });

        Self {
            queue,
            closed,
            evicted,
            _reader: handle,
        }
    }

    /// Non-blocking dequeue of the oldest surviving arrival.
    pub fn try_pop(&self) -> Option<Arrival> {
        self.queue.pop()
    }

    /// True once the reader thread has terminated. Arrivals queued before
    /// termination remain poppable.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Arrivals discarded by drop-oldest overflow so far.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
