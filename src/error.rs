//! Error taxonomy for the co-simulation runtime.
//!
//! Startup failures (config, connect, bind, accept) abort the process with a
//! diagnostic. Frame-level failures (`ShortRead`, `BadMagic`, `Decode`) double
//! as the link-closed signal: the Hardware exits cleanly on them and the
//! Simulator's reader thread flips its closed flag and lets the step loop run
//! out the remaining steps as timeouts. Queue overflow is absorbed internally
//! (drop-oldest) and a step timeout is an operational record, not an error, so
//! neither appears here.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CosimError>;

#[derive(Debug, Error)]
pub enum CosimError {
    #[error("invalid configuration {key}={value:?}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("accept on {addr}: {source}")]
    Accept {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The byte stream ended inside a frame header or payload.
    #[error("stream ended mid-frame")]
    ShortRead,

    #[error("bad frame magic 0x{found:08X}")]
    BadMagic { found: u32 },

    #[error("frame decode: {0}")]
    Decode(String),

    #[error("frame encode: {0}")]
    Encode(String),

    /// Fatal on the Simulator: the pacemaker cannot continue without its
    /// command path.
    #[error("send failed at step {step_id}: {source}")]
    Send {
        step_id: u64,
        #[source]
        source: io::Error,
    },
}
