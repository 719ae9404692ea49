//! step_log.rs
//! Append-only per-step CSV writers, one per side.
//!
//! Column order is part of the external contract consumed by the offline RTT
//! analysis; booleans are rendered `True`/`False` and `deadline_miss_ms` with
//! three decimals so existing tooling parses both runtimes' logs identically.
//! Rows are flushed as they are written; a row that reached `append` is on
//! disk even if the process dies on the next step.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::error;
use serde::{Serialize, Serializer};

use crate::error::{CosimError, Result};

pub const SIM_LOG_FILE: &str = "sim_log.csv";
pub const HW_LOG_FILE: &str = "act_log.csv";

/// Pick the run directory under `base` and create it.
///
/// A `LOG_TIMESTAMP` value nests the logs one level down so repeated runs do
/// not clobber each other; a value that is an unexpanded shell fragment
/// (`$(...)`) is replaced by the current local time. No timestamp writes
/// directly into `base`.
pub fn resolve_log_dir(base: &Path, timestamp: Option<&str>) -> Result<PathBuf> {
    let dir = match timestamp {
        None => base.to_path_buf(),
        Some(ts) if ts.starts_with("$(") => base.join(
            chrono::Local::now()
                .format("%Y%m%d_%H%M%S")
                .to_string(),
        ),
        Some(ts) => base.join(ts),
    };
    fs::create_dir_all(&dir).map_err(|e| CosimError::Config {
        key: "LOG_DIR",
        value: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(dir)
}

fn python_bool<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

fn millis3<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.3}"))
}

/// Simulator log row. Timestamp columns are zero when the step timed out.
#[derive(Debug, Clone, Serialize)]
pub struct SimStepRow {
    pub step_id: u64,
    pub t_sim_send_ns: u64,
    pub t_sim_recv_ns: u64,
    pub t_act_recv_ns: u64,
    pub t_act_send_ns: u64,
    #[serde(serialize_with = "python_bool")]
    pub timeout: bool,
    #[serde(serialize_with = "millis3")]
    pub deadline_miss_ms: f64,
}

/// Hardware log row.
#[derive(Debug, Clone, Serialize)]
pub struct HwStepRow {
    pub step_id: u64,
    pub t_act_recv_ns: u64,
    pub t_act_send_ns: u64,
    #[serde(serialize_with = "python_bool")]
    pub missing_cmd: bool,
    pub note: String,
}

pub struct SimStepLogger {
    writer: csv::Writer<BufWriter<File>>,
}

impl SimStepLogger {
    pub fn create(dir: &Path) -> Result<Self> {
        Ok(Self {
            writer: open_writer(dir.join(SIM_LOG_FILE))?,
        })
    }

    /// Rows are never mutated after append. A failed write is reported and
    /// the loop carries on rather than stalling the pacemaker.
    pub fn append(&mut self, row: &SimStepRow) {
        if let Err(e) = self.writer.serialize(row) {
            error!("[sim] log row {}: {e}", row.step_id);
        }
        if let Err(e) = self.writer.flush() {
            error!("[sim] log flush: {e}");
        }
    }

    pub fn finish(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!("[sim] log flush: {e}");
        }
    }
}

pub struct HwStepLogger {
    writer: csv::Writer<BufWriter<File>>,
}

impl HwStepLogger {
    pub fn create(dir: &Path) -> Result<Self> {
        Ok(Self {
            writer: open_writer(dir.join(HW_LOG_FILE))?,
        })
    }

    pub fn append(&mut self, row: &HwStepRow) {
        if let Err(e) = self.writer.serialize(row) {
            error!("[act] log row {}: {e}", row.step_id);
        }
        if let Err(e) = self.writer.flush() {
            error!("[act] log flush: {e}");
        }
    }

    pub fn finish(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!("[act] log flush: {e}");
        }
    }
}

fn open_writer(path: PathBuf) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(&path).map_err(|e| CosimError::Config {
        key: "LOG_DIR",
        value: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(csv::Writer::from_writer(BufWriter::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_log_header_and_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = SimStepLogger::create(dir.path()).unwrap();
        logger.append(&SimStepRow {
            step_id: 0,
            t_sim_send_ns: 100,
            t_sim_recv_ns: 250,
            t_act_recv_ns: 40,
            t_act_send_ns: 60,
            timeout: false,
            deadline_miss_ms: 0.0,
        });
        logger.append(&SimStepRow {
            step_id: 1,
            t_sim_send_ns: 500,
            t_sim_recv_ns: 0,
            t_act_recv_ns: 0,
            t_act_send_ns: 0,
            timeout: true,
            deadline_miss_ms: 1.2345,
        });
        drop(logger);

        let content = fs::read_to_string(dir.path().join(SIM_LOG_FILE)).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "step_id,t_sim_send_ns,t_sim_recv_ns,t_act_recv_ns,t_act_send_ns,timeout,deadline_miss_ms"
        );
        assert_eq!(lines.next().unwrap(), "0,100,250,40,60,False,0.000");
        assert_eq!(lines.next().unwrap(), "1,500,0,0,0,True,1.234");
        assert!(lines.next().is_none());
    }

    #[test]
    fn hw_log_header_and_note() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = HwStepLogger::create(dir.path()).unwrap();
        logger.append(&HwStepRow {
            step_id: 3,
            t_act_recv_ns: 10,
            t_act_send_ns: 20,
            missing_cmd: false,
            note: "addition_processed".into(),
        });
        drop(logger);

        let content = fs::read_to_string(dir.path().join(HW_LOG_FILE)).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "step_id,t_act_recv_ns,t_act_send_ns,missing_cmd,note"
        );
        assert_eq!(lines.next().unwrap(), "3,10,20,False,addition_processed");
    }

    #[test]
    fn log_dir_flat_without_timestamp() {
        let base = tempfile::tempdir().unwrap();
        let dir = resolve_log_dir(base.path(), None).unwrap();
        assert_eq!(dir, base.path());
    }

    #[test]
    fn log_dir_nests_under_timestamp() {
        let base = tempfile::tempdir().unwrap();
        let dir = resolve_log_dir(base.path(), Some("20260802_101500")).unwrap();
        assert_eq!(dir, base.path().join("20260802_101500"));
        assert!(dir.is_dir());
    }

    #[test]
    fn unexpanded_shell_fragment_falls_back_to_clock() {
        let base = tempfile::tempdir().unwrap();
        let dir = resolve_log_dir(base.path(), Some("$(date +%s)")).unwrap();
        assert_ne!(dir, base.path());
        assert!(dir.is_dir());
        assert!(!dir.file_name().unwrap().to_string_lossy().contains('$'));
    }

    #[test]
    fn unwritable_log_dir_is_a_startup_error() {
        let base = tempfile::tempdir().unwrap();
        let occupied = base.path().join("taken");
        fs::write(&occupied, b"file, not dir").unwrap();
        let err = resolve_log_dir(&occupied, None).unwrap_err();
        assert!(matches!(err, CosimError::Config { key: "LOG_DIR", .. }));
    }
}
