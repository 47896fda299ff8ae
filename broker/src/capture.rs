// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional pcap journaling of every reflected datagram.

use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

use serial_proto::pcap::PcapWriter;

use crate::error::{BrokerError, Result};

/// Owns the capture file, if `-w` was given. `None` means captures are
/// disabled and [`Capture::record`] is a no-op.
pub struct Capture {
    writer: Option<PcapWriter<File>>,
}

impl Capture {
    /// Disabled capture: every [`Capture::record`] call is a no-op.
    #[must_use]
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    /// Create (truncating) the capture file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| BrokerError::CaptureFile {
            path: path.display().to_string(),
            source,
        })?;
        let writer = PcapWriter::new(file).map_err(|source| BrokerError::CaptureFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            writer: Some(writer),
        })
    }

    /// Append `payload` to the journal, if capturing is enabled. A
    /// capture-file write failure is fatal, unlike a per-peer send
    /// failure in the reflector.
    pub fn record(&mut self, payload: &[u8]) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.write_packet(payload, SystemTime::now())?;
            writer.flush()?;
        }
        Ok(())
    }
}
