//! transport.rs
//! TCP session setup for both roles.
//!
//! The Simulator dials the Hardware once with blocking semantics and no retry;
//! the Hardware binds with address reuse, accepts exactly one peer, and closes
//! the listener. Nagle is disabled on both ends: the workload is small,
//! latency-dominated frames, and coalescing them would serialize the loop on
//! the ACK clock.

use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::info;
use socket2::{Domain, SockAddr, Socket, Type};

use crate::error::{CosimError, Result};

/// Simulator side: connect to the Hardware peer and disable Nagle.
pub fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let addr = format!("{host}:{port}");
    let stream = TcpStream::connect(&addr).map_err(|e| CosimError::Connect {
        addr: addr.clone(),
        source: e,
    })?;
    stream
        .set_nodelay(true)
        .map_err(|e| CosimError::Connect { addr, source: e })?;
    Ok(stream)
}

/// Hardware side: a bound, listening socket awaiting its single peer.
///
/// Built through socket2 so address reuse is set before bind; the kernel then
/// accepts an immediate rebind after a previous run left the port in
/// TIME_WAIT.
pub struct Listener {
    inner: TcpListener,
    addr: SocketAddr,
}

impl Listener {
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let spec = format!("{host}:{port}");
        let addr = resolve(&spec)?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)
            .map_err(|e| bind_err(&spec, e))?;
        socket
            .set_reuse_address(true)
            .map_err(|e| bind_err(&spec, e))?;
        socket
            .bind(&SockAddr::from(addr))
            .map_err(|e| bind_err(&spec, e))?;
        // Backlog 1: exactly one Simulator will ever dial in.
        socket.listen(1).map_err(|e| bind_err(&spec, e))?;

        let inner: TcpListener = socket.into();
        let addr = inner.local_addr().map_err(|e| bind_err(&spec, e))?;
        Ok(Self { inner, addr })
    }

    /// Actual bound address; the port differs from the requested one when
    /// binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Blocks for the single peer, then drops the listener so no second
    /// connection can ever be queued.
    pub fn accept_one(self) -> Result<TcpStream> {
        let (stream, peer) = self.inner.accept().map_err(|e| CosimError::Accept {
            addr: self.addr.to_string(),
            source: e,
        })?;
        stream.set_nodelay(true).map_err(|e| CosimError::Accept {
            addr: self.addr.to_string(),
            source: e,
        })?;
        info!("[act] connected: {peer}");
        Ok(stream)
    }
}

fn resolve(spec: &str) -> Result<SocketAddr> {
    let mut addrs = spec.to_socket_addrs().map_err(|e| bind_err(spec, e))?;
    addrs.next().ok_or_else(|| CosimError::Bind {
        addr: spec.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
    })
}

fn bind_err(spec: &str, source: std::io::Error) -> CosimError {
    CosimError::Bind {
        addr: spec.to_string(),
        source,
    }
}
