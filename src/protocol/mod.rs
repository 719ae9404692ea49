// Wire protocol: framed transport of a single JSON record per frame.
// framing owns the byte-level codec; message owns the record shapes
// exchanged between Simulator and Hardware.

pub mod framing;
pub mod message;
