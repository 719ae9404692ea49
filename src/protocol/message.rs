//! message.rs
//! Record shapes carried inside frames, and the one shape-aware helper the
//! runtime owns: deriving a neutral command when a step times out.
//!
//! The `cmd` payload and the telemetry response body are opaque to the
//! transport; only the plug-in bodies interpret them. Decoders tolerate
//! unknown fields for forward compatibility.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One frame payload. External tagging yields exactly
/// `{"command":{..}}` / `{"telemetry":{..}}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Envelope {
    #[serde(rename = "command")]
    Command(CommandMessage),
    #[serde(rename = "telemetry")]
    Telemetry(TelemetryMessage),
}

/// Simulator → Hardware, one per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Assigned by the Simulator, strictly increasing from 0.
    pub step_id: u64,
    /// Simulator monotonic clock at send.
    pub timestamp_ns: u64,
    /// Opaque structured payload; `null` when the producer had nothing.
    #[serde(default)]
    pub cmd: Value,
}

/// Hardware → Simulator. Carries the `step_id` of the command it answers;
/// the Hardware never invents one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryMessage {
    pub step_id: u64,
    /// Hardware monotonic clock at command arrival.
    pub t_act_recv_ns: u64,
    /// Hardware monotonic clock immediately before the reply send.
    pub t_act_send_ns: u64,
    #[serde(default)]
    pub missing_cmd: bool,
    #[serde(default)]
    pub note: String,
    /// Opaque response body (`result`, `state`, ... as the hardware body
    /// chooses). Flattening keeps the wire shape a single telemetry object
    /// and makes the decoder tolerant of fields it does not know.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Zero value with the same shape as `cmd`: a list maps to a list of zeros,
/// a mapping to the same keys with zero values, a bare number to zero.
/// Anything else has no meaningful neutral and becomes `null`.
///
/// Handed to the plant updater on a timed-out step so the callback sees a
/// deterministic input shape whether or not the peer answered.
pub fn neutral_command(cmd: &Value) -> Value {
    match cmd {
        Value::Array(items) => Value::Array(items.iter().map(|_| Value::from(0.0)).collect()),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for key in map.keys() {
                out.insert(key.clone(), Value::from(0.0));
            }
            Value::Object(out)
        }
        Value::Number(_) => Value::from(0.0),
        _ => Value::Null,
    }
}
