//! Simulator process entry point.
//!
//! Reads the environment, dials the Hardware peer, and drives the numeric
//! body through the full step budget. Exit code 0 on clean completion,
//! non-zero on a configuration, connect, or send failure.

use std::process::ExitCode;

use log::{error, info};

use hil_cosim::models::numeric::NumericSim;
use hil_cosim::sim::scheduler::Simulator;
use hil_cosim::utils::config::SimConfig;

fn main() -> ExitCode {
    env_logger::init();

    let cfg = match SimConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("[sim] {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "[sim] target: {}:{}, steps: {}, period: {} ms, reply window: {} ms",
        cfg.act_host, cfg.act_port, cfg.total_steps, cfg.step_ms, cfg.reply_timeout_ms
    );

    let simulator = match Simulator::connect(cfg, NumericSim::new()) {
        Ok(simulator) => simulator,
        Err(e) => {
            error!("[sim] {e}");
            return ExitCode::FAILURE;
        }
    };

    match simulator.run() {
        Ok(summary) => {
            info!(
                "[sim] run complete: {} steps, {} timeouts, {} deadline misses",
                summary.steps, summary.timeouts, summary.deadline_misses
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("[sim] {e}");
            ExitCode::FAILURE
        }
    }
}
