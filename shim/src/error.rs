// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shim's error type.
//!
//! Everything here is fatal except [`ShimError::PtyHangup`], which the
//! event loop catches inline: it means the kernel driver closed its end of
//! the tty, the PTY has already been fully re-acquired by the time the
//! error surfaces, and the in-flight command (if any) was simply dropped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShimError {
    #[error("baud rate {0} is not supported (expected 115200 or 921600)")]
    UnsupportedBaudRate(u32),

    #[error("could not resolve a usable UDP destination for {host}:{port}")]
    UnresolvableDestination { host: String, port: u16 },

    /// The PTY hung up (EOF or EIO) during a read. By the time this is
    /// returned the master has already been closed and a fresh one
    /// acquired; callers should treat this as "no command was parsed" and
    /// move on, not as fatal.
    #[error("PTY hung up; reopened the fake serial device")]
    PtyHangup,

    #[error("system call failed: {0}")]
    Errno(#[from] nix::errno::Errno),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShimError>;
