// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for `fakeserial`.

use clap::Parser;

/// Impersonate an IEEE 802.15.4 Serial V1 radio on a pseudo-terminal,
/// bridging it to a UDP wireless emulation fabric.
#[derive(Debug, Parser)]
#[command(name = "fakeserial", disable_version_flag = true)]
pub struct Cli {
    /// Local UDP port this shim binds to.
    #[arg(short = 'l', long = "udp-local-port")]
    pub udp_local_port: u16,

    /// Remote UDP destination host (the broker).
    #[arg(short = 'd', long = "udp-dest")]
    pub udp_dest: String,

    /// Remote UDP destination port (the broker).
    #[arg(short = 'r', long = "udp-remote-port")]
    pub udp_remote_port: u16,

    /// Serial baud rate to advertise: 115200 or 921600.
    #[arg(short = 'b', long = "baudrate", default_value_t = 921_600)]
    pub baudrate: u32,

    /// Filesystem path of the symlink to the allocated pseudo-terminal.
    #[arg(short = 'n', long = "device-name", default_value = "fakeserial0")]
    pub device_name: String,

    /// Increase log verbosity; repeatable.
    #[arg(long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print version information and exit, matching the original CLI's `-v`.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),
}
