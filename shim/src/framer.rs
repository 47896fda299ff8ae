// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Serial V1 framing and command dispatch.
//!
//! Conceptually this is the byte-by-byte state machine from spec §4.2:
//! `IDLE -> GOT_Z -> READY -> READ_PAYLOAD(op, remaining) -> IDLE`. In
//! practice no state needs to survive between calls to [`parse_one`]: a
//! whole command is read and dispatched within a single call via a
//! cascade of blocking reads, and [`parse_one`] bails out (without
//! emitting a response) the moment a byte doesn't match what the current
//! state expects. The next call always starts over at IDLE, which is
//! exactly the GOT_Z -> IDLE transition the spec describes -- it falls
//! out of the control flow instead of being tracked explicitly.
//!
//! One consequence, preserved deliberately (see spec §4.2 and §9): a
//! stray `'z'` only resynchronizes the stream if the byte immediately
//! following it is neither `'z'` nor `'b'`. `'z' 'z' 'b' <opcode>` loses
//! the real preamble; `'z' 'x' 'z' 'b' <opcode>` finds it. This matches
//! the original firmware's resync behavior bug-for-bug.

use serial_proto::frame::{RESPONSE_MASK, STATUS_SUCCESS};
use serial_proto::opcode::RX_BLOCK;
use serial_proto::{Opcode, MAX_FRAME_LEN, PREAMBLE};

use crate::device::DeviceState;
use crate::error::Result;

/// Everything the framer needs from the PTY: byte-at-a-time reads for
/// framing bytes, bulk reads for known-length payloads, and a single
/// atomic write per response. Abstracted so the framer can be tested
/// without a real pseudo-terminal.
pub trait SerialPort {
    fn read_byte(&mut self) -> Result<u8>;
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
}

/// Where a decoded `TX_BLOCK` payload goes. Implemented by the UDP peer
/// channel; abstracted here for the same reason as [`SerialPort`].
pub trait FrameSink {
    fn send(&mut self, payload: &[u8]) -> Result<()>;
}

/// The response opcode byte for a device-initiated `RX_BLOCK` record (no
/// corresponding request ever exists, so this doesn't live in [`Opcode`]).
pub const RX_BLOCK_RESPONSE: u8 = RX_BLOCK | RESPONSE_MASK;

/// Parse and dispatch exactly one command from `serial`.
///
/// Returns `Ok(())` whether or not a command was actually recognized and
/// answered: garbage bytes preceding a valid preamble are silently
/// dropped, never answered, and never treated as an error. A PTY hang-up
/// surfaces as `Err(ShimError::PtyHangup)` from the underlying
/// [`SerialPort`] and is not handled here -- the caller (the event loop)
/// treats it as "no command was parsed this time".
pub fn parse_one<S: SerialPort, U: FrameSink>(
    serial: &mut S,
    udp: &mut U,
    device: &mut DeviceState,
) -> Result<()> {
    if serial.read_byte()? != PREAMBLE[0] {
        return Ok(());
    }
    log::trace!("received 'z'");

    if serial.read_byte()? != PREAMBLE[1] {
        return Ok(());
    }
    log::trace!("received 'b'");

    let opcode = Opcode::from_byte(serial.read_byte()?);
    log::debug!("parse_one: dispatching opcode {:#04x}", opcode.raw());
    dispatch(opcode, serial, udp, device)
}

fn dispatch<S: SerialPort, U: FrameSink>(
    opcode: Opcode,
    serial: &mut S,
    udp: &mut U,
    device: &mut DeviceState,
) -> Result<()> {
    match opcode {
        Opcode::SetPanId => {
            let mut payload = [0u8; 2];
            serial.read_exact(&mut payload)?;
            device.set_pan_id(payload[0], payload[1]);
            respond(serial, opcode, &[])
        }
        Opcode::SetShortAddr => {
            let mut payload = [0u8; 2];
            serial.read_exact(&mut payload)?;
            device.set_short_addr(payload[0], payload[1]);
            respond(serial, opcode, &[])
        }
        Opcode::SetLongAddr => {
            let mut payload = [0u8; 8];
            serial.read_exact(&mut payload)?;
            device.set_long_addr(payload);
            respond(serial, opcode, &[])
        }
        Opcode::GetAddr => respond(serial, opcode, &device.long_addr()),
        Opcode::TxBlock => {
            // The length byte is protocol-constrained to MAX_FRAME_LEN, but
            // nothing stops a misbehaving driver from sending more; clamp
            // rather than let a bad byte panic on the slice index.
            let len = usize::from(serial.read_byte()?).min(MAX_FRAME_LEN);
            let mut payload = [0u8; MAX_FRAME_LEN];
            serial.read_exact(&mut payload[..len])?;
            udp.send(&payload[..len])?;
            respond(serial, opcode, &[])
        }
        Opcode::SetChannel => {
            let _channel = serial.read_byte()?; // unconditionally ignored, see spec §9
            respond(serial, opcode, &[])
        }
        Opcode::Open
        | Opcode::Close
        | Opcode::Ed
        | Opcode::Cca
        | Opcode::SetState
        | Opcode::Other(_) => respond(serial, opcode, &[]),
    }
}

fn respond<S: SerialPort>(serial: &mut S, opcode: Opcode, extra: &[u8]) -> Result<()> {
    let mut record = Vec::with_capacity(4 + extra.len());
    record.extend_from_slice(&PREAMBLE);
    record.push(opcode.response_byte());
    record.push(STATUS_SUCCESS);
    record.extend_from_slice(extra);
    serial.write_all(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeSerial {
        input: VecDeque<u8>,
        output: Vec<u8>,
    }

    impl FakeSerial {
        fn from_hex(bytes: &[u8]) -> Self {
            Self {
                input: bytes.iter().copied().collect(),
                output: Vec::new(),
            }
        }
    }

    impl SerialPort for FakeSerial {
        fn read_byte(&mut self) -> Result<u8> {
            Ok(self.input.pop_front().expect("test ran out of input bytes"))
        }

        fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
            for slot in buf {
                *slot = self.input.pop_front().expect("test ran out of input bytes");
            }
            Ok(())
        }

        fn write_all(&mut self, buf: &[u8]) -> Result<()> {
            self.output.extend_from_slice(buf);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeUdp {
        sent: Vec<Vec<u8>>,
    }

    impl FrameSink for FakeUdp {
        fn send(&mut self, payload: &[u8]) -> Result<()> {
            self.sent.push(payload.to_vec());
            Ok(())
        }
    }

    fn run(input: &[u8]) -> (FakeSerial, FakeUdp, DeviceState) {
        let mut serial = FakeSerial::from_hex(input);
        let mut udp = FakeUdp::default();
        let mut device = DeviceState::new();
        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        (serial, udp, device)
    }

    #[test]
    fn set_panid_scenario() {
        let (serial, _udp, device) = run(&[0x7A, 0x62, 0x0F, 0x12, 0x34]);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x8F, 0x00]);
        assert_eq!(device.pan_id(), 0x1234);
    }

    #[test]
    fn set_shortaddr_scenario() {
        let (serial, _udp, device) = run(&[0x7A, 0x62, 0x10, 0xAA, 0xBB]);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x90, 0x00]);
        assert_eq!(device.short_addr(), [0xBB, 0xAA]);
    }

    #[test]
    fn set_longaddr_then_get_addr_scenario() {
        let mut serial =
            FakeSerial::from_hex(&[0x7A, 0x62, 0x11, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        let mut udp = FakeUdp::default();
        let mut device = DeviceState::new();
        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x91, 0x00]);

        serial.input.extend([0x7A, 0x62, 0x0D]);
        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        assert_eq!(
            serial.output,
            vec![
                0x7A, 0x62, 0x91, 0x00, // SET_LONGADDR response
                0x7A, 0x62, 0x8D, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // GET_ADDR response
            ]
        );
    }

    #[test]
    fn tx_block_scenario() {
        let (serial, udp, _device) = run(&[0x7A, 0x62, 0x09, 0x03, 0xDE, 0xAD, 0xBE]);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x89, 0x00]);
        assert_eq!(udp.sent, vec![vec![0xDE, 0xAD, 0xBE]]);
    }

    #[test]
    fn tx_block_zero_length() {
        let (serial, udp, _device) = run(&[0x7A, 0x62, 0x09, 0x00]);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x89, 0x00]);
        assert_eq!(udp.sent, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn tx_block_max_length() {
        let mut input = vec![0x7A, 0x62, 0x09, 0x7F];
        input.extend(std::iter::repeat(0xAB).take(127));
        let (serial, udp, _device) = run(&input);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x89, 0x00]);
        assert_eq!(udp.sent[0].len(), 127);
    }

    #[test]
    fn set_channel_is_ignored() {
        let (serial, _udp, _device) = run(&[0x7A, 0x62, 0x04, 0x0B]);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0x84, 0x00]);
    }

    #[test]
    fn bare_opcodes_just_succeed() {
        for opcode in [0x01, 0x02, 0x05, 0x06, 0x07] {
            let (serial, _udp, _device) = run(&[0x7A, 0x62, opcode]);
            assert_eq!(serial.output, vec![0x7A, 0x62, opcode | 0x80, 0x00]);
        }
    }

    #[test]
    fn unrecognized_opcode_is_permissive() {
        let (serial, _udp, _device) = run(&[0x7A, 0x62, 0x42]);
        assert_eq!(serial.output, vec![0x7A, 0x62, 0xC2, 0x00]);
    }

    #[test]
    fn garbage_before_preamble_never_responds() {
        let (serial, _udp, _device) = run(&[0x41, 0x42, 0x43]);
        assert!(serial.output.is_empty());
    }

    #[test]
    fn stray_z_followed_by_non_b_then_valid_preamble_resyncs_on_next_call() {
        // 'z' 'x' 'z' 'b' <GET_ADDR> -- first call consumes 'z','x' and bails;
        // the next call starts fresh and finds the real preamble.
        let mut serial = FakeSerial::from_hex(&[b'z', b'x', b'z', b'b', 0x0D]);
        let mut udp = FakeUdp::default();
        let mut device = DeviceState::new();

        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        assert!(serial.output.is_empty());

        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        assert_eq!(
            serial.output,
            vec![0x7A, 0x62, 0x8D, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn double_z_then_b_loses_the_real_preamble() {
        // 'z' 'z' 'b' <opcode> -- bug-compatible: the first call sees
        // byte2='z' (not 'b') and bails having eaten both 'z's, so the
        // next call starts at 'b', which never matches PREAMBLE[0].
        let mut serial = FakeSerial::from_hex(&[b'z', b'z', b'b', 0x0D]);
        let mut udp = FakeUdp::default();
        let mut device = DeviceState::new();

        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        parse_one(&mut serial, &mut udp, &mut device).unwrap();
        assert!(serial.output.is_empty());
    }

    #[test]
    fn get_addr_response_is_exactly_twelve_bytes() {
        let (serial, _udp, _device) = run(&[0x7A, 0x62, 0x0D]);
        assert_eq!(serial.output.len(), 12);
    }
}
