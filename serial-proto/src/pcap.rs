// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal pcap writer, good for exactly one thing: journaling the raw
//! IEEE 802.15.4 frames the broker reflects.
//!
//! This intentionally does not pull in a pcap crate. The format is four
//! fixed-width integers for the global header and four more per packet;
//! reproducing it by hand keeps the broker's only file-format dependency
//! a couple of `to_le_bytes` calls.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

/// pcap link type for IEEE 802.15.4 frames without an FCS.
pub const LINKTYPE_IEEE802_15_4: u32 = 230;

/// Snapshot length recorded in the global header: the IEEE 802.15.4 MTU.
pub const SNAPLEN: u32 = crate::frame::MAX_FRAME_LEN as u32;

const MAGIC: u32 = 0xA1B2_C3D4;
const VERSION_MAJOR: u16 = 2;
const VERSION_MINOR: u16 = 4;

/// Writes pcap-formatted captures to any [`Write`] sink.
///
/// The global header is written as soon as the writer is constructed.
/// Every subsequent packet gets its own 16-byte record header followed by
/// the payload verbatim -- no padding, no alignment.
pub struct PcapWriter<W: Write> {
    sink: W,
}

impl<W: Write> PcapWriter<W> {
    /// Create a new writer, immediately emitting the 24-byte global header.
    pub fn new(mut sink: W) -> io::Result<Self> {
        write_global_header(&mut sink)?;
        Ok(Self { sink })
    }

    /// Append one packet, timestamped with the wall-clock `timestamp`.
    ///
    /// `ts_sec`/`ts_usec` are truncated to 32 bits, matching the classic
    /// pcap format (not pcapng); this implementation does not claim
    /// correctness past the year 2106.
    pub fn write_packet(&mut self, payload: &[u8], timestamp: SystemTime) -> io::Result<()> {
        let since_epoch = timestamp.duration_since(UNIX_EPOCH).unwrap_or_default();
        let ts_sec = since_epoch.as_secs() as u32;
        let ts_usec = since_epoch.subsec_micros();
        let len = payload.len() as u32;

        let mut header = [0u8; 16];
        header[0..4].copy_from_slice(&ts_sec.to_le_bytes());
        header[4..8].copy_from_slice(&ts_usec.to_le_bytes());
        header[8..12].copy_from_slice(&len.to_le_bytes());
        header[12..16].copy_from_slice(&len.to_le_bytes());

        self.sink.write_all(&header)?;
        self.sink.write_all(payload)
    }

    /// Flush the underlying sink, surfacing any I/O error. Per-peer-send
    /// failures in the reflector are tolerated; a capture-file write
    /// failure is not, so callers should propagate this.
    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

fn write_global_header<W: Write>(w: &mut W) -> io::Result<()> {
    let mut header = [0u8; 24];
    header[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    header[4..6].copy_from_slice(&VERSION_MAJOR.to_le_bytes());
    header[6..8].copy_from_slice(&VERSION_MINOR.to_le_bytes());
    header[8..12].copy_from_slice(&0i32.to_le_bytes());
    header[12..16].copy_from_slice(&0u32.to_le_bytes());
    header[16..20].copy_from_slice(&SNAPLEN.to_le_bytes());
    header[20..24].copy_from_slice(&LINKTYPE_IEEE802_15_4.to_le_bytes());
    w.write_all(&header)
}
