// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The duplex event loop: wait on the PTY and the UDP socket, service
//! whichever (or both) are ready, repeat.

use std::os::fd::AsFd;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout};

use serial_proto::frame::PREAMBLE;
use serial_proto::{DEFAULT_LQI, MAX_FRAME_LEN};

use crate::device::DeviceState;
use crate::error::{Result, ShimError};
use crate::framer::{self, SerialPort, RX_BLOCK_RESPONSE};
use crate::pty::PtyEndpoint;
use crate::udp::UdpPeer;

/// Run the event loop until a fatal error occurs. PTY hang-ups are caught
/// here and logged, not propagated: they are the one expected "error" that
/// means "keep going".
pub fn run(mut pty: PtyEndpoint, mut udp: UdpPeer) -> Result<()> {
    let mut device = DeviceState::new();

    loop {
        let pty_fd = pty.as_fd();
        let udp_fd = udp.as_fd();
        let mut fds = [
            PollFd::new(pty_fd, PollFlags::POLLIN),
            PollFd::new(udp_fd, PollFlags::POLLIN),
        ];

        log::trace!("poll: waiting for new activity");
        match nix::poll::poll(&mut fds, PollTimeout::NONE) {
            Ok(_) => {}
            Err(Errno::EINTR) => continue,
            Err(err) => return Err(ShimError::Errno(err)),
        }

        let pty_ready = fds[0]
            .revents()
            .is_some_and(|events| events.contains(PollFlags::POLLIN));
        let udp_ready = fds[1]
            .revents()
            .is_some_and(|events| events.contains(PollFlags::POLLIN));

        drop(fds);

        if udp_ready {
            log::trace!("poll: received a packet from the backend");
            service_udp(&mut udp, &mut pty)?;
        }

        if pty_ready {
            log::trace!("poll: received a packet from the fake serial device");
            match framer::parse_one(&mut pty, &mut udp, &mut device) {
                Ok(()) => {}
                Err(ShimError::PtyHangup) => {
                    log::warn!("PTY hung up mid-command; reopened and resuming");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// One inbound UDP datagram becomes one device-initiated `RX_BLOCK`
/// record on the PTY: LQI byte, length byte, payload verbatim. Unlike a
/// command response, this carries no status byte -- the original firmware
/// never sent one for a device-initiated record (see spec §8 scenario 5).
fn service_udp(udp: &mut UdpPeer, pty: &mut PtyEndpoint) -> Result<()> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    let len = udp.recv(&mut buf)?;
    let record = rx_block_record(&buf[..len]);

    match pty.write_all(&record) {
        Ok(()) => Ok(()),
        Err(ShimError::PtyHangup) => {
            log::warn!("PTY hung up delivering an inbound datagram; dropped it");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Build the bytes written to the PTY for one inbound datagram.
fn rx_block_record(payload: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(4 + payload.len());
    record.extend_from_slice(&PREAMBLE);
    record.push(RX_BLOCK_RESPONSE);
    record.push(DEFAULT_LQI);
    record.push(payload.len() as u8);
    record.extend_from_slice(payload);
    record
}
