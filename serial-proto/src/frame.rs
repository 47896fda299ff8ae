// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame size constants shared by the framer and the UDP peer channel.

/// The two bytes that open every command and response record.
pub const PREAMBLE: [u8; 2] = [b'z', b'b'];

/// Maximum IEEE 802.15.4 MAC payload size.
pub const MAX_FRAME_LEN: usize = 127;

/// Maximum size of a single command or response on the wire: 2 preamble
/// bytes + 1 opcode byte + 1 length byte + up to `MAX_FRAME_LEN` payload
/// bytes, rounded up to account for the LQI byte on `RX_BLOCK` responses.
pub const MAX_COMMAND_LEN: usize = MAX_FRAME_LEN + 5;

/// The bit OR'd into a request opcode to mark a response (or a
/// device-initiated record such as `RX_BLOCK`).
pub const RESPONSE_MASK: u8 = 0x80;

/// The single status byte meaning "success". No other status value is ever
/// produced by this implementation: every handled and unrecognized opcode
/// alike responds with success, per the permissive dispatch in [`crate::opcode`].
pub const STATUS_SUCCESS: u8 = 0x00;

/// The link-quality indicator this implementation always reports on
/// injected `RX_BLOCK` frames. Kept as a named constant rather than a
/// literal `0` so a richer emulation has an obvious place to parameterize it.
pub const DEFAULT_LQI: u8 = 0;
