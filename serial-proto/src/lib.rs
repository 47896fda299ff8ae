// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire constants for the Serial V1 framing protocol and the pcap capture
//! format, shared by the `shim` and `broker` binaries.
//!
//! Neither binary needs to agree on much at compile time -- the shim speaks
//! Serial V1 on one side and raw UDP datagrams on the other, and the broker
//! only ever sees raw UDP datagrams -- but both agree on the IEEE 802.15.4
//! frame size limits and the broker additionally needs the pcap link type
//! used for 802.15.4 captures. Keeping these in one crate means the shim's
//! framer tests and the broker's capture tests exercise the same constants.

pub mod frame;
pub mod opcode;
pub mod pcap;

pub use frame::{DEFAULT_LQI, MAX_COMMAND_LEN, MAX_FRAME_LEN, PREAMBLE};
pub use opcode::Opcode;
