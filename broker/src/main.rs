// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `udp-broker`: reflects UDP datagrams to every other registered peer,
//! emulating a shared-medium wireless link, with optional pcap capture.

use std::net::UdpSocket;

use anyhow::{Context, Result};
use clap::Parser;

use ieee802154_udp_broker::capture::Capture;
use ieee802154_udp_broker::cli::Cli;
use ieee802154_udp_broker::peers::PeerSet;
use ieee802154_udp_broker::reflector;

fn main() -> Result<()> {
    let cli = Cli::parse();

    stderrlog::new()
        .module(module_path!())
        .module("ieee802154_udp_broker")
        .verbosity(usize::from(cli.verbose) + 2)
        .init()
        .context("failed to initialize logging")?;

    let socket = UdpSocket::bind(("0.0.0.0", cli.local_port))
        .with_context(|| format!("failed to bind UDP socket on port {}", cli.local_port))?;

    log::info!("udp-broker listening on port {}", cli.local_port);

    let capture = match &cli.capture_file {
        Some(path) => {
            log::info!("capturing reflected traffic to {}", path.display());
            Capture::create(path)
                .with_context(|| format!("failed to open capture file {}", path.display()))?
        }
        None => Capture::disabled(),
    };

    reflector::run(&socket, PeerSet::new(), capture).context("reflector loop terminated")?;

    Ok(())
}
