// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `mudwork` CLI.
#[derive(Debug, Error)]
pub enum Error {
    #[error("daemon not running: no socket at {0}\n  hint: start it with 'mudworkd --config <path>'")]
    DaemonNotRunning(String),

    #[error("daemon error: {0}")]
    Daemon(String),

    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),

    #[error("no identifiers in {0}")]
    EmptySnapshot(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
