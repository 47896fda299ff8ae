// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pseudo-terminal acquisition, exposed at a caller-chosen path and kept
//! alive (and re-acquired) across hang-ups from the kernel driver.

use std::fs;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use nix::sys::termios::{self, BaudRate, InputFlags, LocalFlags, SetArg};

use crate::error::{Result, ShimError};
use crate::framer::SerialPort;

/// The supported baud rates, matching the original firmware's choices.
fn baud_rate(value: u32) -> Result<BaudRate> {
    match value {
        115_200 => Ok(BaudRate::B115200),
        921_600 => Ok(BaudRate::B921600),
        other => Err(ShimError::UnsupportedBaudRate(other)),
    }
}

/// A PTY master, re-opened transparently across hang-ups. `device_path` is
/// the caller-visible symlink (e.g. `/dev/fakeserial0`) kept pointed at the
/// current slave's `/dev/pts/N`.
pub struct PtyEndpoint {
    master: PtyMaster,
    device_path: PathBuf,
    baud: BaudRate,
}

impl PtyEndpoint {
    /// Allocate a master PTY, configure it, and publish the symlink.
    pub fn open(device_path: impl Into<PathBuf>, baud_value: u32) -> Result<Self> {
        let baud = baud_rate(baud_value)?;
        let device_path = device_path.into();
        let master = acquire_and_publish(&device_path, baud)?;
        Ok(Self {
            master,
            device_path,
            baud,
        })
    }

    /// Re-open the PTY from scratch, publishing a fresh symlink. Called
    /// after a hang-up; the device state living above this layer is
    /// untouched.
    fn reacquire(&mut self) -> Result<()> {
        self.master = acquire_and_publish(&self.device_path, self.baud)?;
        Ok(())
    }

    fn handle_io_result<T>(&mut self, result: io::Result<T>) -> Result<T>
    where
        T: Default,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) if is_hangup(&err) => {
                self.reacquire()?;
                Err(ShimError::PtyHangup)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn is_hangup(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::UnexpectedEof || err.raw_os_error() == Some(libc_eio())
}

/// `EIO`'s numeric value, without pulling in `libc` solely for one constant.
fn libc_eio() -> i32 {
    nix::errno::Errno::EIO as i32
}

fn acquire_and_publish(device_path: &Path, baud: BaudRate) -> Result<PtyMaster> {
    let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY)?;
    grantpt(&master)?;
    unlockpt(&master)?;
    let slave_name = ptsname_r(&master)?;

    configure_raw(&master, baud)?;
    publish_symlink(device_path, &slave_name)?;

    Ok(master)
}

fn configure_raw(master: &PtyMaster, baud: BaudRate) -> Result<()> {
    let mut attrs = termios::tcgetattr(master)?;

    attrs.input_flags.set(InputFlags::IGNBRK, true);
    attrs.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG);
    attrs.control_flags.set(termios::ControlFlags::CLOCAL, true);
    attrs.control_flags.set(termios::ControlFlags::CREAD, true);
    attrs.control_flags.set(termios::ControlFlags::CS8, true);
    attrs.control_chars[termios::SpecialCharacterIndices::VMIN as usize] = 1;
    attrs.control_chars[termios::SpecialCharacterIndices::VTIME as usize] = 5;

    termios::cfsetispeed(&mut attrs, baud)?;
    termios::cfsetospeed(&mut attrs, baud)?;

    termios::tcsetattr(master, SetArg::TCSANOW, &attrs)?;
    Ok(())
}

fn publish_symlink(device_path: &Path, slave_name: &str) -> Result<()> {
    match fs::remove_file(device_path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    symlink(slave_name, device_path)?;
    Ok(())
}

impl SerialPort for PtyEndpoint {
    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let result = self.master.read(&mut buf).and_then(|n| {
            if n == 0 {
                Err(io::Error::from(io::ErrorKind::UnexpectedEof))
            } else {
                Ok(())
            }
        });
        self.handle_io_result(result)?;
        Ok(buf[0])
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let result = self.master.read_exact(buf);
        self.handle_io_result(result)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let result = self.master.write_all(buf);
        self.handle_io_result(result)
    }
}

impl AsFd for PtyEndpoint {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }
}

impl AsRawFd for PtyEndpoint {
    fn as_raw_fd(&self) -> i32 {
        self.master.as_raw_fd()
    }
}
