//! Hardware process entry point.
//!
//! Binds, accepts the single Simulator peer, and serves commands with the
//! numeric body until the link closes. A closed link is the normal end of a
//! run: exit code 0. Only configuration and socket-setup failures are fatal.

use std::process::ExitCode;

use log::{error, info};

use hil_cosim::hw::responder::Responder;
use hil_cosim::models::numeric::NumericHw;
use hil_cosim::transport::Listener;
use hil_cosim::utils::config::HwConfig;

fn main() -> ExitCode {
    env_logger::init();

    let cfg = match HwConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("[act] {e}");
            return ExitCode::FAILURE;
        }
    };

    let listener = match Listener::bind(&cfg.bind_host, cfg.act_port) {
        Ok(listener) => listener,
        Err(e) => {
            error!("[act] {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("[act] listening on {}", listener.local_addr());

    let stream = match listener.accept_one() {
        Ok(stream) => stream,
        Err(e) => {
            error!("[act] {e}");
            return ExitCode::FAILURE;
        }
    };

    let responder = match Responder::new(stream, &cfg, NumericHw::new()) {
        Ok(responder) => responder,
        Err(e) => {
            error!("[act] {e}");
            return ExitCode::FAILURE;
        }
    };

    match responder.run() {
        Ok(()) => {
            info!("[act] done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("[act] {e}");
            ExitCode::FAILURE
        }
    }
}
