// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shim's single UDP peer channel: one fixed destination, resolved
//! once at startup.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::{Result, ShimError};
use crate::framer::FrameSink;

/// Send buffer size applied to the socket, matching the original's `setsockopt`.
const SEND_BUFFER_BYTES: usize = 2048;

/// The shim's UDP side: a locally-bound, unconnected socket with exactly
/// one remembered destination.
pub struct UdpPeer {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpPeer {
    /// Resolve `dest_host:dest_port`, probe each candidate address family
    /// for routability, and bind a socket on `local_port` in that family.
    /// The first candidate that works wins; no candidate is a fatal error.
    pub fn connect(dest_host: &str, dest_port: u16, local_port: u16) -> Result<Self> {
        let candidates = (dest_host, dest_port)
            .to_socket_addrs()
            .map_err(|_| ShimError::UnresolvableDestination {
                host: dest_host.to_string(),
                port: dest_port,
            })?;

        for candidate in candidates {
            if let Ok(socket) = build_socket(candidate, local_port) {
                return Ok(Self {
                    socket: socket.into(),
                    destination: candidate,
                });
            }
        }

        Err(ShimError::UnresolvableDestination {
            host: dest_host.to_string(),
            port: dest_port,
        })
    }

    /// Receive one inbound datagram, expecting at most 127 bytes of
    /// 802.15.4 MAC payload.
    pub fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.socket.recv(buf)?)
    }
}

/// Probe `candidate`'s address family for routability (a transient connect
/// that is immediately discarded), then build the real socket: unconnected,
/// `SO_REUSEADDR`, a 2048-byte send buffer, bound to the wildcard address
/// on `local_port` in the same family.
///
/// `std::net::UdpSocket` has no way to disconnect back to `AF_UNSPEC`, so
/// unlike the original this builds a second, fresh socket for the real
/// traffic rather than reusing the probe socket; the net effect -- an
/// unconnected, locally-bound socket with a single remembered destination
/// held alongside it -- is the same.
fn build_socket(candidate: SocketAddr, local_port: u16) -> Result<Socket> {
    let domain = if candidate.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let probe = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    probe.connect(&candidate.into())?;
    drop(probe);

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_send_buffer_size(SEND_BUFFER_BYTES)?;

    let wildcard: SocketAddr = if candidate.is_ipv4() {
        (std::net::Ipv4Addr::UNSPECIFIED, local_port).into()
    } else {
        (std::net::Ipv6Addr::UNSPECIFIED, local_port).into()
    };
    socket.bind(&wildcard.into())?;

    Ok(socket)
}

impl FrameSink for UdpPeer {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.socket.send_to(payload, self.destination)?;
        Ok(())
    }
}

impl AsFd for UdpPeer {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}

impl AsRawFd for UdpPeer {
    fn as_raw_fd(&self) -> i32 {
        self.socket.as_raw_fd()
    }
}
