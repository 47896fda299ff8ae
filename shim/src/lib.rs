// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Library half of `fakeserial`, split out from the binary so the framer,
//! device state, and event loop can be exercised from integration tests
//! without a real pseudo-terminal.

pub mod cli;
pub mod device;
pub mod error;
pub mod event_loop;
pub mod framer;
pub mod pty;
pub mod udp;
