//! # Hardware-in-the-Loop Co-Simulation Runtime
//!
//! Couples two processes over a single TCP stream into a fixed-rate,
//! hard-deadlined control loop and records per-step timing for offline
//! round-trip-time analysis.
//!
//! ## Roles
//! - **Simulator (pacemaker):** every step period it emits a framed command,
//!   consumes whatever telemetry has arrived, advances its plant model, and
//!   sleeps to the next period boundary.
//! - **Hardware (responder):** consumes commands, computes a response, and
//!   returns telemetry stamped with its own monotonic clock.
//!
//! ## Key Architecture
//! - **Framing:** `MAGIC || LENGTH || JSON` frames, bit-exact round-trip.
//! - **Decoupled receive:** a background reader thread feeds a bounded
//!   drop-oldest queue (1024) so the pacemaker never blocks on a slow peer.
//! - **Strict step matching:** telemetry is matched to the current step only;
//!   stale and future arrivals are discarded.
//! - **Deadline accounting:** timeouts and deadline misses are independent and
//!   both land in append-only CSV logs, one row per step on each side.

pub mod error;
pub mod hw;
pub mod models;
pub mod protocol;
pub mod sim;
pub mod transport;
pub mod utils;

pub use error::{CosimError, Result};
