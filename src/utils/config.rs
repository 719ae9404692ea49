//! Environment configuration intake.
//!
//! Read once at startup into immutable records; a malformed value fails fast
//! before any socket or log file is touched. Missing keys take the defaults
//! below.
//!
//! | Key                | Default (sim / hw)   | Meaning                    |
//! |--------------------|----------------------|----------------------------|
//! | `ACT_HOST`         | `act` / `0.0.0.0`    | peer host / bind address   |
//! | `ACT_PORT`         | `5001`               | TCP port                   |
//! | `STEP_MS`          | `10`                 | step period                |
//! | `REPLY_TIMEOUT_MS` | `2`                  | per-step wait window       |
//! | `TOTAL_STEPS`      | `1000`               | termination count          |
//! | `LOG_DIR`          | `/app/logs`          | CSV output directory       |
//! | `LOG_TIMESTAMP`    | unset                | optional run subdirectory  |

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{CosimError, Result};

const DEFAULT_SIM_PEER_HOST: &str = "act";
const DEFAULT_HW_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_STEP_MS: u64 = 10;
const DEFAULT_REPLY_TIMEOUT_MS: u64 = 2;
const DEFAULT_TOTAL_STEPS: u64 = 1000;
const DEFAULT_LOG_DIR: &str = "/app/logs";

/// Simulator-side configuration.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub act_host: String,
    pub act_port: u16,
    pub step_ms: u64,
    pub reply_timeout_ms: u64,
    pub total_steps: u64,
    pub log_dir: PathBuf,
    pub log_timestamp: Option<String>,
}

impl SimConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            act_host: get("ACT_HOST").unwrap_or_else(|| DEFAULT_SIM_PEER_HOST.into()),
            act_port: parse(get, "ACT_PORT", DEFAULT_PORT)?,
            step_ms: parse(get, "STEP_MS", DEFAULT_STEP_MS)?,
            reply_timeout_ms: parse(get, "REPLY_TIMEOUT_MS", DEFAULT_REPLY_TIMEOUT_MS)?,
            total_steps: parse(get, "TOTAL_STEPS", DEFAULT_TOTAL_STEPS)?,
            log_dir: get("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.into()).into(),
            log_timestamp: get("LOG_TIMESTAMP").filter(|v| !v.is_empty()),
        })
    }
}

/// Hardware-side configuration. `step_ms` is the Simulator's pace; plant
/// bodies that integrate at the step period derive their `dt` from it via
/// [`HwConfig::dt`].
#[derive(Debug, Clone)]
pub struct HwConfig {
    pub bind_host: String,
    pub act_port: u16,
    pub step_ms: u64,
    pub log_dir: PathBuf,
    pub log_timestamp: Option<String>,
}

impl HwConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            bind_host: get("ACT_HOST").unwrap_or_else(|| DEFAULT_HW_BIND_HOST.into()),
            act_port: parse(get, "ACT_PORT", DEFAULT_PORT)?,
            step_ms: parse(get, "STEP_MS", DEFAULT_STEP_MS)?,
            log_dir: get("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.into()).into(),
            log_timestamp: get("LOG_TIMESTAMP").filter(|v| !v.is_empty()),
        })
    }

    /// Integration step in seconds for plant bodies driven at the step
    /// period.
    pub fn dt(&self) -> f64 {
        self.step_ms as f64 / 1000.0
    }
}

fn parse<T>(get: &dyn Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| CosimError::Config {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
