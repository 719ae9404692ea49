//! Vehicle bodies: a speed-profile commander on the Simulator and a
//! P-controlled longitudinal plant on the Hardware, integrated with forward
//! Euler at the step period.

use log::debug;
use serde_json::{json, Value};

use crate::models::{HwModel, HwResponse, SimModel};
use crate::protocol::message::TelemetryMessage;

const CRUISE_SPEED: f64 = 10.0;
const REDUCED_SPEED: f64 = 5.0;
/// Step at which the profile drops from cruise to reduced speed.
const SPEED_DROP_STEP: u64 = 1000;
/// Proportional gain of the plant's speed controller.
const P_GAIN: f64 = 0.5;

/// Commands a target speed per step and mirrors the plant state the
/// Hardware reports back.
#[derive(Debug, Default)]
pub struct VehicleSim {
    target_speed: f64,
    speed: f64,
    position: f64,
}

impl VehicleSim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn position(&self) -> f64 {
        self.position
    }
}

impl SimModel for VehicleSim {
    fn generate_command(&mut self, step_id: u64) -> Value {
        self.target_speed = if step_id < SPEED_DROP_STEP {
            CRUISE_SPEED
        } else {
            REDUCED_SPEED
        };
        json!({ "target_speed": self.target_speed, "step_id": step_id })
    }

    fn update_plant(&mut self, _step_id: u64, _applied_cmd: &Value, reply: Option<&TelemetryMessage>) {
        let Some(result) = reply.and_then(|tel| tel.payload.get("result")) else {
            return;
        };
        self.speed = result
            .get("actual_speed")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        self.position = result
            .get("actual_position")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        debug!(
            "[sim] speed: {:.2} m/s, position: {:.2} m",
            self.speed, self.position
        );
    }
}

/// Longitudinal plant: acceleration from a P controller on the speed error,
/// speed and position integrated with `dt`, speed clamped at zero.
#[derive(Debug)]
pub struct VehicleHw {
    dt: f64,
    speed: f64,
    position: f64,
    acceleration: f64,
}

impl VehicleHw {
    /// `dt` in seconds; call sites derive it from the step period
    /// (`HwConfig::dt`).
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            speed: 0.0,
            position: 0.0,
            acceleration: 0.0,
        }
    }
}

impl HwModel for VehicleHw {
    fn handle_command(&mut self, cmd: &Value) -> HwResponse {
        let Value::Object(map) = cmd else {
            return HwResponse {
                result: json!({ "actual_speed": 0.0, "actual_position": 0.0 }),
                state: None,
                note: "vehicle_updated",
            };
        };

        let target_speed = map
            .get("target_speed")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        let speed_error = target_speed - self.speed;
        self.acceleration = speed_error * P_GAIN;
        self.speed += self.acceleration * self.dt;
        self.position += self.speed * self.dt;
        if self.speed < 0.0 {
            self.speed = 0.0;
        }

        HwResponse {
            result: json!({
                "actual_speed": self.speed,
                "actual_position": self.position,
                "acceleration": self.acceleration,
            }),
            state: None,
            note: "vehicle_updated",
        }
    }
}
