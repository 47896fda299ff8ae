// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The broker's error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to open capture file {path}")]
    CaptureFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BrokerError>;
