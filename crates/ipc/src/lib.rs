// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for CLI-daemon communication.
//!
//! This crate defines the message types and framing protocol used between
//! the `mudwork` CLI (or any directory notifier) and the `mudworkd` daemon.
//! Messages are serialized as JSON with length-prefixed framing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use mw_core::{Kind, TransactionEntry};

// ============================================================================
// Protocol types
// ============================================================================

/// Request sent to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonRequest {
    /// Get daemon status.
    Status,
    /// Graceful shutdown.
    Shutdown,
    /// Ping to check if daemon is alive.
    Ping,
    /// Version handshake request.
    Hello { version: String },
    /// Changes were queued out of band; drain the queue.
    Notify { changes: usize },
    /// Snapshot of the authoritative directory. The daemon computes the
    /// delta against its managed users, queues it and drains.
    Reconcile { identifiers: Vec<String> },
    /// List pending queue entries.
    ListQueue,
}

/// Response sent from the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DaemonResponse {
    /// Status response.
    Status(DaemonStatus),
    /// Shutdown acknowledged.
    ShuttingDown,
    /// Pong response.
    Pong,
    /// Error response.
    Error { message: String },
    /// Version handshake response.
    Hello { version: String },
    /// Drain request accepted.
    Notified,
    /// Result of queueing a directory snapshot.
    Reconciled(ReconcileSummary),
    /// Pending queue entries.
    Queue { entries: Vec<TransactionEntry> },
}

/// Counts from queueing a directory snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Add entries newly queued.
    pub queued_add: usize,
    /// Remove entries newly queued.
    pub queued_remove: usize,
    /// Add entries that were already queued.
    pub dup_add: usize,
    /// Remove entries that were already queued.
    pub dup_remove: usize,
}

impl ReconcileSummary {
    /// Every change the delta produced, queued now or earlier.
    pub fn total(&self) -> usize {
        self.queued_add + self.queued_remove + self.dup_add + self.dup_remove
    }

    /// Record one enqueue attempt.
    pub fn record(&mut self, kind: Kind, inserted: bool) {
        match (kind, inserted) {
            (Kind::Add, true) => self.queued_add += 1,
            (Kind::Add, false) => self.dup_add += 1,
            (Kind::Remove, true) => self.queued_remove += 1,
            (Kind::Remove, false) => self.dup_remove += 1,
        }
    }
}

/// Daemon status information.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatus {
    /// Current daemon PID.
    pub pid: u32,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Entries waiting in the queue.
    pub queued: usize,
    /// Users currently holding the entitlement.
    pub managed_users: usize,
    /// Size of the store on disk.
    pub db_size_bytes: u64,
    /// Remote API responses seen, by HTTP status code.
    pub responses: BTreeMap<u16, u64>,
    /// Whether batches are sent in the API's test-only mode.
    pub test_mode: bool,
}

impl DaemonStatus {
    /// Create a new status with the given parameters.
    pub fn new(pid: u32, uptime_secs: u64) -> Self {
        Self {
            pid,
            uptime_secs,
            ..Self::default()
        }
    }
}

// ============================================================================
// Message framing
// ============================================================================

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    use super::{DaemonRequest, DaemonResponse};

    /// Maximum message size (8MB); directory snapshots can be large.
    const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let json = serde_json::to_vec(message)
            .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
        if json.len() > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                json.len(),
                MAX_MESSAGE_SIZE
            )));
        }
        let len =
            u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;

        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
    }

    pub fn write_request<W: Write>(writer: &mut W, request: &DaemonRequest) -> std::io::Result<()> {
        write_message(writer, request)
    }

    pub fn read_request<R: Read>(reader: &mut R) -> std::io::Result<DaemonRequest> {
        read_message(reader)
    }

    pub fn write_response<W: Write>(
        writer: &mut W,
        response: &DaemonResponse,
    ) -> std::io::Result<()> {
        write_message(writer, response)
    }

    pub fn read_response<R: Read>(reader: &mut R) -> std::io::Result<DaemonResponse> {
        read_message(reader)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
