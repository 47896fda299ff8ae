// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `fakeserial`: impersonates an IEEE 802.15.4 Serial V1 radio on a
//! pseudo-terminal, bridging it to a UDP wireless emulation fabric.

use anyhow::{Context, Result};
use clap::Parser;

use ieee802154_serial_shim::cli::Cli;
use ieee802154_serial_shim::event_loop;
use ieee802154_serial_shim::pty::PtyEndpoint;
use ieee802154_serial_shim::udp::UdpPeer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    stderrlog::new()
        .module(module_path!())
        .module("ieee802154_serial_shim")
        .verbosity(usize::from(cli.verbose) + 2)
        .init()
        .context("failed to initialize logging")?;

    log::info!(
        "starting fakeserial: device={} baud={} local_port={} dest={}:{}",
        cli.device_name,
        cli.baudrate,
        cli.udp_local_port,
        cli.udp_dest,
        cli.udp_remote_port
    );

    let pty = PtyEndpoint::open(&cli.device_name, cli.baudrate)
        .with_context(|| format!("failed to acquire pseudo-terminal at {}", cli.device_name))?;

    let udp = UdpPeer::connect(&cli.udp_dest, cli.udp_remote_port, cli.udp_local_port)
        .with_context(|| {
            format!(
                "failed to set up UDP peer channel to {}:{}",
                cli.udp_dest, cli.udp_remote_port
            )
        })?;

    event_loop::run(pty, udp).context("event loop terminated")?;

    Ok(())
}
