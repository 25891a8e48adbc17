// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! IPC client for communicating with the mudworkd daemon.

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mw_core::TransactionEntry;
use mw_ipc::{framing, DaemonRequest, DaemonResponse, DaemonStatus, ReconcileSummary};

use crate::error::{Error, Result};

/// Connection timeout for daemon communication.
const TIMEOUT_SECS: u64 = 30;

/// Socket filename within the state directory.
pub const SOCKET_NAME: &str = "daemon.sock";

pub fn socket_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SOCKET_NAME)
}

/// A client connection to the daemon. Each request uses its own connection.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(state_dir: &Path) -> Self {
        DaemonClient {
            socket_path: socket_path(state_dir),
        }
    }

    fn connect(&self) -> Result<UnixStream> {
        if !self.socket_path.exists() {
            return Err(Error::DaemonNotRunning(
                self.socket_path.display().to_string(),
            ));
        }
        let stream = UnixStream::connect(&self.socket_path)
            .map_err(|e| Error::Daemon(format!("failed to connect to daemon: {}", e)))?;

        stream
            .set_read_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| Error::Daemon(format!("failed to set read timeout: {}", e)))?;
        stream
            .set_write_timeout(Some(Duration::from_secs(TIMEOUT_SECS)))
            .map_err(|e| Error::Daemon(format!("failed to set write timeout: {}", e)))?;
        Ok(stream)
    }

    /// Send a request and receive a response.
    fn request(&self, request: DaemonRequest) -> Result<DaemonResponse> {
        let mut stream = self.connect()?;
        framing::write_request(&mut stream, &request)?;
        match framing::read_response(&mut stream)? {
            DaemonResponse::Error { message } => Err(Error::Daemon(message)),
            response => Ok(response),
        }
    }

    pub fn ping(&self) -> Result<()> {
        match self.request(DaemonRequest::Ping)? {
            DaemonResponse::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Exchange versions; returns the daemon's.
    pub fn hello(&self) -> Result<String> {
        let request = DaemonRequest::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        match self.request(request)? {
            DaemonResponse::Hello { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    pub fn status(&self) -> Result<DaemonStatus> {
        match self.request(DaemonRequest::Status)? {
            DaemonResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    pub fn notify(&self, changes: usize) -> Result<()> {
        match self.request(DaemonRequest::Notify { changes })? {
            DaemonResponse::Notified => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub fn reconcile(&self, identifiers: Vec<String>) -> Result<ReconcileSummary> {
        match self.request(DaemonRequest::Reconcile { identifiers })? {
            DaemonResponse::Reconciled(summary) => Ok(summary),
            other => Err(unexpected(other)),
        }
    }

    pub fn list_queue(&self) -> Result<Vec<TransactionEntry>> {
        match self.request(DaemonRequest::ListQueue)? {
            DaemonResponse::Queue { entries } => Ok(entries),
            other => Err(unexpected(other)),
        }
    }

    pub fn shutdown(&self) -> Result<()> {
        match self.request(DaemonRequest::Shutdown)? {
            DaemonResponse::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: DaemonResponse) -> Error {
    Error::UnexpectedResponse(format!("{:?}", response))
}
