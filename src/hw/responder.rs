//! responder.rs
//! The Hardware main loop: blocking read → stamp → handle → stamp → reply.
//!
//! Every received command is answered with telemetry carrying the same
//! `step_id` and the two Hardware-side timestamps, then logged. The loop has
//! no timeout of its own; a decode failure or EOF means the Simulator is
//! gone and the loop exits cleanly so the log survives intact.

use std::io::{BufReader, Write};
use std::net::TcpStream;

use log::{debug, info};
use serde_json::Map;

use crate::error::Result;
use crate::models::HwModel;
use crate::protocol::framing;
use crate::protocol::message::{Envelope, TelemetryMessage};
use crate::utils::clock::MonotonicClock;
use crate::utils::config::HwConfig;
use crate::utils::step_log::{self, HwStepLogger, HwStepRow};

/// Whether telemetry actually leaves the process. `Drop` handles and logs
/// every command but suppresses the send, a fault model for timeout
/// experiments. Step ids are untouched either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyPolicy {
    #[default]
    Always,
    Drop,
}

pub struct Responder<M: HwModel> {
    stream: TcpStream,
    clock: MonotonicClock,
    logger: HwStepLogger,
    model: M,
    policy: ReplyPolicy,
}

impl<M: HwModel> Responder<M> {
    /// Wrap an accepted peer connection. The log file is created here so a
    /// run that dies mid-stream still leaves a parseable log.
    pub fn new(stream: TcpStream, cfg: &HwConfig, model: M) -> Result<Self> {
        let dir = step_log::resolve_log_dir(&cfg.log_dir, cfg.log_timestamp.as_deref())?;
        let logger = HwStepLogger::create(&dir)?;
        Ok(Self {
            stream,
            clock: MonotonicClock::new(),
            logger,
            model,
            policy: ReplyPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: ReplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Serve commands until the link dies. Always returns `Ok`: the peer
    /// closing the stream, cleanly or mid-frame, is the normal end of a
    /// run, not a failure.
    pub fn run(mut self) -> Result<()> {
        let mut stream = BufReader::new(self.stream);

        loop {
            let cmd_msg = match framing::decode_one(&mut stream) {
                Ok(Envelope::Command(msg)) => msg,
                Ok(Envelope::Telemetry(tel)) => {
                    debug!("[act] ignoring telemetry frame for step {}", tel.step_id);
                    continue;
                }
                Err(e) => {
                    info!("[act] error/closed: {e}");
                    break;
                }
            };

            let t_act_recv = self.clock.now_ns();
            let missing_cmd = cmd_msg.cmd.is_null();
            let response = self.model.handle_command(&cmd_msg.cmd);
            let t_act_send = self.clock.now_ns();

            let note = if missing_cmd { "missing_cmd" } else { response.note };

            let mut payload = Map::new();
            payload.insert("result".into(), response.result);
            if let Some(state) = response.state {
                payload.insert("state".into(), state);
            }

            if self.policy == ReplyPolicy::Always {
                let telemetry = TelemetryMessage {
                    step_id: cmd_msg.step_id,
                    t_act_recv_ns: t_act_recv,
                    t_act_send_ns: t_act_send,
                    missing_cmd,
                    note: note.to_string(),
                    payload,
                };
                let frame = framing::encode(&Envelope::Telemetry(telemetry))?;
                if let Err(e) = stream.get_mut().write_all(&frame) {
                    info!("[act] error/closed on send: {e}");
                    break;
                }
            }

            self.logger.append(&HwStepRow {
                step_id: cmd_msg.step_id,
                t_act_recv_ns: t_act_recv,
                t_act_send_ns: t_act_send,
                missing_cmd,
                note: note.to_string(),
            });
        }

        self.logger.finish();
        Ok(())
    }
}
