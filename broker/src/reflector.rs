// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The reflector loop: receive a datagram, capture it, and fan it out to
//! every other known peer.

use std::net::{SocketAddr, UdpSocket};

use serial_proto::MAX_FRAME_LEN;

use crate::capture::Capture;
use crate::error::Result;
use crate::peers::PeerSet;

/// Run the reflector loop forever. Only capture-file I/O errors are
/// fatal; a failed send to an individual peer is logged and ignored.
pub fn run(socket: &UdpSocket, mut peers: PeerSet, mut capture: Capture) -> Result<()> {
    let mut buf = [0u8; MAX_FRAME_LEN];

    loop {
        let (len, sender) = socket.recv_from(&mut buf)?;
        let payload = &buf[..len];

        capture.record(payload)?;

        let is_new = peers.register(sender);
        if is_new {
            log::debug!("registered new peer {sender}");
        }

        forward(socket, &peers, sender, payload);
    }
}

/// Send `payload` to every peer except `sender`. Per-peer failures are
/// tolerated: the reflector keeps going for the remaining peers.
fn forward(socket: &UdpSocket, peers: &PeerSet, sender: SocketAddr, payload: &[u8]) {
    for peer in peers.others(sender) {
        if let Err(err) = socket.send_to(payload, peer) {
            log::warn!("failed to forward {} bytes to {peer}: {err}", payload.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_skips_the_sender_and_tolerates_unreachable_peers() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut peers = PeerSet::new();
        let sender: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let unreachable: SocketAddr = "127.0.0.1:2".parse().unwrap();

        peers.register(sender);
        peers.register(unreachable);

        // Must not panic even though `unreachable` refuses the connection.
        forward(&socket, &peers, sender, &[1, 2, 3]);
    }
}
