// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drains the queue one batch at a time until nothing sendable is left.

use crate::builder::BatchBuilder;
use crate::error::Result;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::submit::Submitter;
use crate::SharedDb;

/// Totals for one drain cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub batches: usize,
    pub applied: usize,
    pub failed: usize,
    pub warned: usize,
    pub dropped: usize,
    /// Entries still queued because the directory was unreachable.
    pub deferred: usize,
}

impl DrainReport {
    fn add(&mut self, report: ReconcileReport) {
        self.applied += report.applied;
        self.failed += report.failed;
        self.warned += report.warned;
    }
}

pub struct Drainer {
    db: SharedDb,
    builder: BatchBuilder,
    submitter: Submitter,
    reconciler: Reconciler,
    page_size: usize,
}

impl Drainer {
    pub fn new(
        db: SharedDb,
        builder: BatchBuilder,
        submitter: Submitter,
        reconciler: Reconciler,
        page_size: usize,
    ) -> Self {
        Drainer {
            db,
            builder,
            submitter,
            reconciler,
            page_size,
        }
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    /// Page through the queue until it is empty or only deferred entries
    /// remain.
    pub async fn drain(&self) -> Result<DrainReport> {
        let mut report = DrainReport::default();
        loop {
            // Every built entry leaves the queue, so the deferred ones are
            // exactly the leading `report.deferred` rows.
            let page = self
                .db
                .lock()
                .await
                .peek_page_at(report.deferred, self.page_size)?;
            if page.is_empty() {
                break;
            }

            let batch = self.builder.build(&self.db, &page).await?;
            report.dropped += batch.dropped;
            report.deferred += batch.deferred;
            if batch.is_empty() {
                continue;
            }

            let body = batch.body()?;
            tracing::info!(items = batch.items.len(), "submitting batch");
            let submission = self.submitter.submit(&body).await?;
            let step = self
                .reconciler
                .apply(&submission.outcome, &batch.approved)
                .await?;
            report.batches += 1;
            report.add(step);
        }
        if report.deferred > 0 {
            tracing::warn!(deferred = report.deferred, "entries left in queue until the directory is reachable");
        }
        tracing::info!(
            batches = report.batches,
            applied = report.applied,
            failed = report.failed,
            warned = report.warned,
            dropped = report.dropped,
            deferred = report.deferred,
            "queue drained"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
