// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket server for CLI and notifier requests.
//!
//! Runs on a blocking thread. Handlers take the store lock with
//! `blocking_lock`, so they must never run on an async worker thread.

use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::Arc;
use std::time::{Duration, Instant};

use mw_ipc::{framing, DaemonRequest, DaemonResponse, DaemonStatus};

use crate::stats::Stats;
use crate::worker::{enqueue_snapshot, Notifier};
use crate::SharedDb;

/// Socket read/write timeout per connection.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// State the request handlers need.
pub struct ServerContext {
    pub db: SharedDb,
    pub notifier: Notifier,
    pub stats: Arc<Stats>,
    pub start_time: Instant,
    pub test_mode: bool,
}

/// Accept connections until a `Shutdown` request arrives.
pub fn serve(listener: UnixListener, ctx: &ServerContext) {
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if handle_connection(&mut stream, ctx) {
                    tracing::info!("shutdown requested");
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("failed to accept connection: {}", e);
            }
        }
    }
}

/// Serve one request. Returns true if the daemon should shut down.
fn handle_connection(stream: &mut UnixStream, ctx: &ServerContext) -> bool {
    let _ = stream.set_read_timeout(Some(IO_TIMEOUT));
    let _ = stream.set_write_timeout(Some(IO_TIMEOUT));

    match framing::read_request(stream) {
        Ok(request) => {
            let response = handle_request(request, ctx);
            let should_shutdown = matches!(response, DaemonResponse::ShuttingDown);
            if let Err(e) = framing::write_response(stream, &response) {
                tracing::warn!("failed to write response: {}", e);
            }
            should_shutdown
        }
        Err(e) => {
            tracing::warn!("failed to read request: {}", e);
            false
        }
    }
}

pub fn handle_request(request: DaemonRequest, ctx: &ServerContext) -> DaemonResponse {
    match request {
        DaemonRequest::Ping => DaemonResponse::Pong,
        DaemonRequest::Hello { version } => {
            tracing::debug!(client_version = %version, "hello");
            DaemonResponse::Hello {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }
        }
        DaemonRequest::Status => status(ctx),
        DaemonRequest::Shutdown => DaemonResponse::ShuttingDown,
        DaemonRequest::Notify { changes } => notify(ctx, changes),
        DaemonRequest::Reconcile { identifiers } => {
            let summary = {
                let db = ctx.db.blocking_lock();
                match enqueue_snapshot(&db, &identifiers) {
                    Ok(summary) => summary,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to queue snapshot");
                        return error(e);
                    }
                }
            };
            if summary.total() > 0 {
                if let DaemonResponse::Error { message } = notify(ctx, summary.total()) {
                    return DaemonResponse::Error { message };
                }
            }
            DaemonResponse::Reconciled(summary)
        }
        DaemonRequest::ListQueue => match ctx.db.blocking_lock().list_entries() {
            Ok(entries) => DaemonResponse::Queue { entries },
            Err(e) => error(e),
        },
    }
}

fn status(ctx: &ServerContext) -> DaemonResponse {
    if let Err(e) = ctx.stats.refresh(&ctx.db.blocking_lock()) {
        tracing::warn!(error = %e, "failed to refresh status gauges");
    }
    let mut status = DaemonStatus::new(std::process::id(), ctx.start_time.elapsed().as_secs());
    status.queued = ctx.stats.queued();
    status.managed_users = ctx.stats.managed_users();
    status.db_size_bytes = ctx.stats.db_size_bytes();
    status.responses = ctx.stats.responses();
    status.test_mode = ctx.test_mode;
    DaemonResponse::Status(status)
}

fn notify(ctx: &ServerContext, changes: usize) -> DaemonResponse {
    if ctx.notifier.notify(changes) {
        DaemonResponse::Notified
    } else {
        DaemonResponse::Error {
            message: "queue worker is not running".to_string(),
        }
    }
}

fn error(e: impl std::fmt::Display) -> DaemonResponse {
    DaemonResponse::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
