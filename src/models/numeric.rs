//! Numeric wire-exercise bodies: a monotonically increasing value on the
//! Simulator, a running sum on the Hardware. No physics; these exist to
//! exercise the transport and timing path and to smoke-test a deployment.

use log::debug;
use serde_json::{json, Value};

use crate::models::{HwModel, HwResponse, SimModel};
use crate::protocol::message::TelemetryMessage;

/// Emits `{"value": counter}` with the counter advancing 0.1 per step and
/// remembers the last accumulated result the Hardware reported.
#[derive(Debug, Default)]
pub struct NumericSim {
    counter: f64,
    last_result: f64,
}

impl NumericSim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last `result` the peer reported; 0.0 until the first served step.
    pub fn last_result(&self) -> f64 {
        self.last_result
    }
}

impl SimModel for NumericSim {
    fn generate_command(&mut self, _step_id: u64) -> Value {
        self.counter += 0.1;
        json!({ "value": self.counter })
    }

    fn update_plant(&mut self, _step_id: u64, _applied_cmd: &Value, reply: Option<&TelemetryMessage>) {
        if let Some(result) = reply
            .and_then(|tel| tel.payload.get("result"))
            .and_then(Value::as_f64)
        {
            self.last_result = result;
            debug!("[sim] received result: {result}");
        }
    }
}

/// Accumulates every received value into a running sum and reports it.
/// A mapping contributes its `value` entry, a list the sum of its elements;
/// any other shape is ignored and answered with 0.0.
#[derive(Debug, Default)]
pub struct NumericHw {
    sum: f64,
}

impl NumericHw {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HwModel for NumericHw {
    fn handle_command(&mut self, cmd: &Value) -> HwResponse {
        let result = match cmd {
            Value::Object(map) => {
                self.sum += map.get("value").and_then(Value::as_f64).unwrap_or(0.0);
                self.sum
            }
            Value::Array(items) => {
                self.sum += items.iter().filter_map(Value::as_f64).sum::<f64>();
                self.sum
            }
            _ => 0.0,
        };

        HwResponse {
            result: json!(result),
            state: Some(json!({ "sum": self.sum })),
            note: "addition_processed",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;

    #[test]
    fn counter_advances_by_tenths() {
        let mut sim = NumericSim::new();
        let first = sim.generate_command(0);
        let second = sim.generate_command(1);
        assert!((first["value"].as_f64().unwrap() - 0.1).abs() < 1e-9);
        assert!((second["value"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn hardware_accumulates_mapping_and_list() {
        let mut hw = NumericHw::new();

        let a = hw.handle_command(&json!({"value": 1.5}));
        assert_eq!(a.result, json!(1.5));

        let b = hw.handle_command(&json!([1.0, 2.0, 0.5]));
        assert_eq!(b.result, json!(5.0));
        assert_eq!(b.state, Some(json!({"sum": 5.0})));
        assert_eq!(b.note, "addition_processed");
    }

    #[test]
    fn unusable_shape_answers_zero_without_touching_state() {
        let mut hw = NumericHw::new();
        hw.handle_command(&json!({"value": 2.0}));
        let out = hw.handle_command(&Value::Null);
        assert_eq!(out.result, json!(0.0));
        assert_eq!(out.state, Some(json!({"sum": 2.0})));
    }

    #[test]
    fn sim_tracks_reported_result() {
        let mut sim = NumericSim::new();
        let cmd = sim.generate_command(0);

        let mut payload = Map::new();
        payload.insert("result".into(), json!(7.25));
        let tel = TelemetryMessage {
            step_id: 0,
            t_act_recv_ns: 1,
            t_act_send_ns: 2,
            missing_cmd: false,
            note: "addition_processed".into(),
            payload,
        };

        sim.update_plant(0, &cmd, Some(&tel));
        assert_eq!(sim.last_result(), 7.25);

        // A timed-out step leaves the last result untouched.
        sim.update_plant(1, &json!({"value": 0.0}), None);
        assert_eq!(sim.last_result(), 7.25);
    }
}
