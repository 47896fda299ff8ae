// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for `udp-broker`.

use clap::Parser;

/// Reflect UDP datagrams to every other registered peer, emulating a
/// shared-medium wireless link.
#[derive(Debug, Parser)]
#[command(name = "udp-broker", disable_version_flag = true)]
pub struct Cli {
    /// Local UDP port the broker listens on.
    #[arg(short = 'l', long = "local-port")]
    pub local_port: u16,

    /// Capture file path. If given, every reflected datagram is journaled
    /// in pcap format (truncating any existing file at this path).
    #[arg(short = 'w', long = "capture-file")]
    pub capture_file: Option<std::path::PathBuf>,

    /// Increase log verbosity; repeatable.
    #[arg(long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print version information and exit.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_local_port() {
        assert!(Cli::try_parse_from(["udp-broker"]).is_err());
    }

    #[test]
    fn parses_without_capture_file() {
        let cli = Cli::try_parse_from(["udp-broker", "-l", "9000"]).unwrap();
        assert_eq!(cli.local_port, 9000);
        assert!(cli.capture_file.is_none());
    }

    #[test]
    fn parses_with_capture_file() {
        let cli = Cli::try_parse_from(["udp-broker", "-l", "9000", "-w", "trace.pcap"]).unwrap();
        assert_eq!(cli.capture_file, Some(std::path::PathBuf::from("trace.pcap")));
    }
}
