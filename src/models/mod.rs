// Plug-in surface: the domain bodies the runtime drives but never interprets.
// A Simulator body produces commands and advances its plant; a Hardware body
// answers commands. Payloads stay opaque JSON so the transport and scheduler
// are shape-agnostic.

use serde_json::Value;

use crate::protocol::message::TelemetryMessage;

pub mod numeric;
pub mod vehicle;

/// Simulator-side body: command producer + plant updater.
pub trait SimModel: Send {
    /// Command payload for `step_id`. Called once per step, before the send.
    fn generate_command(&mut self, step_id: u64) -> Value;

    /// Advance the plant after the reply window.
    ///
    /// `applied_cmd` is the command the peer actually served: the payload
    /// from `generate_command` when a matching reply arrived, or its
    /// zero-shaped neutral when the step timed out, so the input shape is
    /// deterministic either way. `reply` carries the matched telemetry when
    /// one arrived.
    fn update_plant(&mut self, step_id: u64, applied_cmd: &Value, reply: Option<&TelemetryMessage>);
}

/// Hardware-side body: command handler.
pub trait HwModel: Send {
    fn handle_command(&mut self, cmd: &Value) -> HwResponse;
}

/// What a hardware body hands back for one command. `result` and `state`
/// travel in the telemetry body; `note` lands in the hardware log row.
#[derive(Debug, Clone)]
pub struct HwResponse {
    pub result: Value,
    pub state: Option<Value>,
    pub note: &'static str,
}
