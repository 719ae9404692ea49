//! framing.rs
//! Length-prefixed framing codec over any byte stream.
//!
//! Frame layout (both directions):
//!
//! ```text
//! +--------+--------+-------- ... --------+
//! | MAGIC  | LENGTH |       PAYLOAD       |
//! | 4 B BE | 4 B BE |  LENGTH bytes UTF-8 |
//! +--------+--------+---------------------+
//! ```
//!
//! PAYLOAD is one compact JSON record (an [`Envelope`]). `encode` and
//! `decode_one` are bit-exact inverses for any valid record, and no partial
//! frame state is kept between calls.

use std::io::{self, Read};

use crate::error::{CosimError, Result};
use crate::protocol::message::Envelope;

/// Frame marker, big-endian on the wire.
pub const MAGIC: u32 = 0xFEED_BEEF;

/// Header size: MAGIC (4) + LENGTH (4).
pub const HEADER_LEN: usize = 8;

/// Upper bound on a single payload. Anything larger is rejected before any
/// allocation so a corrupt length field cannot exhaust memory.
pub const MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// Serializes `envelope` to a compact JSON payload and prepends the header.
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>> {
    let payload =
        serde_json::to_vec(envelope).map_err(|e| CosimError::Encode(e.to_string()))?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(CosimError::Encode(format!(
            "payload of {} bytes exceeds {} byte cap",
            payload.len(),
            MAX_PAYLOAD_LEN
        )));
    }

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&MAGIC.to_be_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Reads exactly one frame from `reader` and parses its payload.
///
/// Fails with `ShortRead` if the stream ends inside the header or payload,
/// `BadMagic` if the marker mismatches, and `Decode` for a corrupt length or
/// unparseable payload.
pub fn decode_one<R: Read>(reader: &mut R) -> Result<Envelope> {
    let mut header = [0u8; HEADER_LEN];
    read_exact(reader, &mut header)?;

    let magic = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    if magic != MAGIC {
        return Err(CosimError::BadMagic { found: magic });
    }

    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if len > MAX_PAYLOAD_LEN {
        return Err(CosimError::Decode(format!(
            "payload length {len} exceeds {MAX_PAYLOAD_LEN} byte cap"
        )));
    }

    let mut payload = vec![0u8; len];
    read_exact(reader, &mut payload)?;

    serde_json::from_slice(&payload).map_err(|e| CosimError::Decode(e.to_string()))
}

// TCP delivers partial reads; read_exact loops for us but folds every failure
// into io::Error, so re-split EOF from transport faults here.
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CosimError::ShortRead,
        _ => CosimError::Decode(format!("read: {e}")),
    })
}
