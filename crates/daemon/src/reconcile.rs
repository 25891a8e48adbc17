// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Applies a batch outcome to the queue and the managed-user set.
//!
//! Every approved entry is dequeued whatever the result. Only entries the
//! API reports as done, with or without a warning, change the managed set.

use std::collections::HashMap;

use mw_core::{BatchOutcome, Kind, OutcomeResult, PerUserError, PerUserWarning};

use crate::builder::ApprovedEntry;
use crate::error::Result;
use crate::SharedDb;

/// Counts for logging after a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries whose mutation was applied (or would be, in test mode).
    pub applied: usize,
    /// Entries the API reported as failed.
    pub failed: usize,
    /// Entries applied despite a warning.
    pub warned: usize,
}

impl ReconcileReport {
    fn merge(&mut self, other: ReconcileReport) {
        self.applied += other.applied;
        self.failed += other.failed;
        self.warned += other.warned;
    }
}

pub struct Reconciler {
    db: SharedDb,
    test_mode: bool,
}

impl Reconciler {
    pub fn new(db: SharedDb, test_mode: bool) -> Self {
        Reconciler { db, test_mode }
    }

    pub async fn apply(
        &self,
        outcome: &BatchOutcome,
        approved: &[ApprovedEntry],
    ) -> Result<ReconcileReport> {
        let result = outcome.result().map_err(|e| {
            tracing::error!(result = %outcome.result, "unexpected batch result");
            e
        })?;
        tracing::info!(
            %result,
            completed = outcome.completed,
            not_completed = outcome.not_completed,
            completed_in_test_mode = outcome.completed_in_test_mode,
            "batch outcome"
        );

        let mut report = ReconcileReport::default();
        match result {
            OutcomeResult::Success => {
                for approved in approved {
                    report.merge(self.finalize(approved, None, None).await?);
                }
            }
            OutcomeResult::Partial => {
                let errors: HashMap<&str, &PerUserError> = outcome
                    .errors()
                    .iter()
                    .map(|e| (e.user.as_str(), e))
                    .collect();
                let warnings: HashMap<&str, &PerUserWarning> = outcome
                    .warnings()
                    .iter()
                    .map(|w| (w.user.as_str(), w))
                    .collect();
                for approved in approved {
                    let address = approved.address.as_str();
                    let step = self
                        .finalize(
                            approved,
                            errors.get(address).copied(),
                            warnings.get(address).copied(),
                        )
                        .await?;
                    report.merge(step);
                }
            }
            OutcomeResult::Error => {
                for error in outcome.errors() {
                    log_error(error);
                }
                let db = self.db.lock().await;
                for approved in approved {
                    db.dequeue(&approved.entry.identifier, approved.entry.kind)?;
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Dequeue one entry and, unless it failed, apply its mutation.
    async fn finalize(
        &self,
        approved: &ApprovedEntry,
        error: Option<&PerUserError>,
        warning: Option<&PerUserWarning>,
    ) -> Result<ReconcileReport> {
        let entry = &approved.entry;
        let db = self.db.lock().await;
        db.dequeue(&entry.identifier, entry.kind)?;

        if let Some(error) = error {
            log_error(error);
            return Ok(ReconcileReport {
                failed: 1,
                ..ReconcileReport::default()
            });
        }

        let mut report = ReconcileReport {
            applied: 1,
            ..ReconcileReport::default()
        };
        if let Some(warning) = warning {
            tracing::warn!(
                user = %warning.user,
                kind = %entry.kind,
                code = %warning.warning_code,
                request_id = %warning.request_id,
                message = %warning.message,
                "request completed with warning"
            );
            report.warned = 1;
        }

        if self.test_mode {
            tracing::info!(user = %entry.identifier, kind = %entry.kind, "test mode, managed users unchanged");
            return Ok(report);
        }
        match entry.kind {
            Kind::Add => db.insert_user(&entry.identifier)?,
            Kind::Remove => {
                db.delete_user(&entry.identifier)?;
            }
        }
        tracing::info!(user = %entry.identifier, kind = %entry.kind, "entitlement updated");
        Ok(report)
    }
}

fn log_error(error: &PerUserError) {
    tracing::error!(
        user = %error.user,
        code = %error.error_code,
        request_id = %error.request_id,
        index = error.index,
        step = error.step,
        message = %error.message,
        "request failed for user"
    );
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
