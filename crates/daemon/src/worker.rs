// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The single queue worker and the producer side that feeds it.

use mw_core::{Database, Delta};
use mw_ipc::ReconcileSummary;
use tokio::sync::mpsc;

use crate::drain::Drainer;
use crate::error::Result;

/// Sending half of the worker's notification channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<usize>,
}

impl Notifier {
    /// Wake the worker. Returns `false` if the worker has stopped.
    pub fn notify(&self, changes: usize) -> bool {
        self.tx.send(changes).is_ok()
    }
}

/// Create the notification channel.
pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<usize>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, rx)
}

/// Drain once per notification, strictly one drain at a time. Returns on
/// the first error, or when every notifier has been dropped.
pub async fn run(drainer: Drainer, mut rx: mpsc::UnboundedReceiver<usize>) -> Result<()> {
    while let Some(changes) = rx.recv().await {
        tracing::info!(changes, "change notification received");
        drainer.drain().await?;
    }
    tracing::info!("notification channel closed, worker stopping");
    Ok(())
}

/// Queue the delta between `identifiers` and the managed users.
pub fn enqueue_snapshot(db: &Database, identifiers: &[String]) -> Result<ReconcileSummary> {
    let managed = db.list_users()?;
    let delta = Delta::compute(identifiers, managed.as_slice());
    let mut summary = ReconcileSummary::default();
    for entry in delta.entries() {
        let inserted = db.enqueue(&entry.identifier, entry.kind)?;
        if inserted {
            tracing::debug!(user = %entry.identifier, kind = %entry.kind, "queued");
        } else {
            tracing::debug!(user = %entry.identifier, kind = %entry.kind, "already queued");
        }
        summary.record(entry.kind, inserted);
    }
    tracing::info!(
        queued_add = summary.queued_add,
        queued_remove = summary.queued_remove,
        dup_add = summary.dup_add,
        dup_remove = summary.dup_remove,
        "directory snapshot queued"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
