//! scheduler.rs
//! The Simulator's periodic step loop, the pacemaker of the whole system.
//!
//! Each step: bump the deadline, produce a command, send it framed, poll the
//! arrival queue for the matching telemetry inside the reply window, advance
//! the plant (neutral command on timeout), then sleep to the period boundary
//! or book the overshoot as a deadline miss. One CSV row per step, always.
//!
//! Two clocks with two jobs: deadline arithmetic runs on the process
//! monotonic nanosecond clock; the reply window is measured with `Instant`
//! deadlines. Neither is affected by wall-time jumps.
//!
//! Matching is strictly by the current `step_id`: a late reply to an earlier
//! step and an early reply to a future step are both discarded. Timeout and
//! deadline miss are independent: a timed-out step usually still makes its
//! boundary, and a served step can overrun it.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use spin_sleep::{SpinSleeper, SpinStrategy};

use crate::error::{CosimError, Result};
use crate::models::SimModel;
use crate::protocol::framing;
use crate::protocol::message::{neutral_command, CommandMessage, Envelope};
use crate::sim::rx_queue::{Arrival, RxQueue};
use crate::transport;
use crate::utils::clock::MonotonicClock;
use crate::utils::config::SimConfig;
use crate::utils::step_log::{self, SimStepLogger, SimStepRow};

/// Poll interval inside the reply window. Short enough to keep matching
/// latency well under a millisecond, long enough to stay off the CPU.
pub const REPLY_POLL_INTERVAL: Duration = Duration::from_micros(200);

/// Aggregate counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub timeouts: u64,
    pub deadline_misses: u64,
    /// Arrivals evicted by the queue's drop-oldest overflow policy.
    pub dropped_arrivals: u64,
    /// Worst matched round-trip, Simulator send to Simulator arrival.
    pub max_rtt_ns: u64,
}

pub struct Simulator<M: SimModel> {
    cfg: SimConfig,
    clock: MonotonicClock,
    stream: TcpStream,
    rx: RxQueue,
    logger: SimStepLogger,
    model: M,
}

impl<M: SimModel> Simulator<M> {
    /// Connect to the Hardware peer and bring up the receive path and log.
    /// The read half goes to the background reader; this struct keeps the
    /// write half. No retry on connect failure.
    pub fn connect(cfg: SimConfig, model: M) -> Result<Self> {
        let stream = transport::connect(&cfg.act_host, cfg.act_port)?;
        info!("[sim] connected to {}:{}", cfg.act_host, cfg.act_port);

        let clock = MonotonicClock::new();
        let read_half = stream.try_clone().map_err(|e| CosimError::Connect {
            addr: format!("{}:{}", cfg.act_host, cfg.act_port),
            source: e,
        })?;
        let rx = RxQueue::spawn(read_half, clock);

        let dir = step_log::resolve_log_dir(&cfg.log_dir, cfg.log_timestamp.as_deref())?;
        let logger = SimStepLogger::create(&dir)?;

        Ok(Self {
            cfg,
            clock,
            stream,
            rx,
            logger,
            model,
        })
    }

    /// Run the full step budget. Returns the aggregate counters on clean
    /// completion; only a send failure aborts early.
    pub fn run(mut self) -> Result<RunSummary> {
        let result = self.run_steps();
        // The reader thread holds a clone of the socket, so dropping this
        // half alone would keep the fd open; shut the session down at the
        // socket level so the peer observes EOF promptly.
        let _ = self.stream.shutdown(Shutdown::Both);
        result
    }

    fn run_steps(&mut self) -> Result<RunSummary> {
        let period_ns = self.cfg.step_ms * 1_000_000;
        if self.cfg.reply_timeout_ms > self.cfg.step_ms {
            warn!(
                "[sim] reply window {} ms exceeds step period {} ms; the wait alone can miss deadlines",
                self.cfg.reply_timeout_ms, self.cfg.step_ms
            );
        }

        let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
        let mut summary = RunSummary::default();
        let mut next_deadline_ns = self.clock.now_ns();

        for step_id in 0..self.cfg.total_steps {
            next_deadline_ns += period_ns;

            let cmd = self.model.generate_command(step_id);
            let t_sim_send = self.clock.now_ns();
            let frame = framing::encode(&Envelope::Command(CommandMessage {
                step_id,
                timestamp_ns: t_sim_send,
                cmd: cmd.clone(),
            }))?;
            self.stream
                .write_all(&frame)
                .map_err(|e| CosimError::Send { step_id, source: e })?;

            let reply = self.wait_for_reply(step_id);

            match &reply {
                Some(arrival) => {
                    self.model
                        .update_plant(step_id, &cmd, Some(&arrival.telemetry));
                }
                None => {
                    // Peer never served this step: the plant advances on the
                    // zero-shaped twin of the command instead.
                    self.model
                        .update_plant(step_id, &neutral_command(&cmd), None);
                }
            }

            let (t_sim_recv, t_act_recv, t_act_send, timeout) = match &reply {
                Some(arrival) => {
                    summary.max_rtt_ns = summary
                        .max_rtt_ns
                        .max(arrival.arrival_ns.saturating_sub(t_sim_send));
                    (
                        arrival.arrival_ns,
                        arrival.telemetry.t_act_recv_ns,
                        arrival.telemetry.t_act_send_ns,
                        false,
                    )
                }
                None => {
                    summary.timeouts += 1;
                    (0, 0, 0, true)
                }
            };

            let now_ns = self.clock.now_ns();
            let mut deadline_miss_ms = 0.0;
            if next_deadline_ns > now_ns {
                sleeper.sleep(Duration::from_nanos(next_deadline_ns - now_ns));
            } else {
                deadline_miss_ms = (now_ns - next_deadline_ns) as f64 / 1_000_000.0;
                summary.deadline_misses += 1;
                warn!("[sim] DEADLINE MISS {deadline_miss_ms:.3} ms @ step {step_id}");
            }

            self.logger.append(&SimStepRow {
                step_id,
                t_sim_send_ns: t_sim_send,
                t_sim_recv_ns: t_sim_recv,
                t_act_recv_ns: t_act_recv,
                t_act_send_ns: t_act_send,
                timeout,
                deadline_miss_ms,
            });
            summary.steps += 1;
        }

        summary.dropped_arrivals = self.rx.evicted();
        self.logger.finish();
        info!(
            "[sim] finished by TOTAL_STEPS: {} steps, {} timeouts, {} deadline misses, max rtt {} ns",
            summary.steps, summary.timeouts, summary.deadline_misses, summary.max_rtt_ns
        );
        Ok(summary)
    }

    /// Poll the arrival queue until the telemetry for `step_id` shows up or
    /// the reply window closes. Arrivals for any other step are discarded on
    /// sight. A dead reader is not special-cased: the window is exhausted
    /// the same way and the step books a clean timeout.
    fn wait_for_reply(&mut self, step_id: u64) -> Option<Arrival> {
        let wait_until = Instant::now() + Duration::from_millis(self.cfg.reply_timeout_ms);
        while Instant::now() < wait_until {
            match self.rx.try_pop() {
                Some(arrival) if arrival.telemetry.step_id == step_id => return Some(arrival),
                Some(other) => {
                    debug!(
                        "[sim] discarding telemetry for step {} while waiting for {}",
                        other.telemetry.step_id, step_id
                    );
                }
                None => thread::sleep(REPLY_POLL_INTERVAL),
            }
        }
        None
    }
}
